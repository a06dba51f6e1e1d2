// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The four corner points a caller supplies for a PDF417 symbol, plus the derived pixel-space
//! rectangle the scanning decoder walks.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// The bounding rectangle of a symbol, derived from up to four corner points. A point on one side
/// may be missing (one row-indicator column wasn't found); the missing corner is then projected
/// onto the image edge from its surviving partner.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    img_width: i32,
    img_height: i32,
    top_left: Point,
    bottom_left: Point,
    top_right: Point,
    bottom_right: Point,
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

impl BoundingBox {
    /// At least one of (top_left, top_right) and one of (bottom_left, bottom_right) must be
    /// known, and a known left corner always has its partner left corner known (same for right).
    pub fn create(
        img_width: i32,
        img_height: i32,
        top_left: Option<Point>,
        bottom_left: Option<Point>,
        top_right: Option<Point>,
        bottom_right: Option<Point>,
    ) -> Option<BoundingBox> {
        if (top_left.is_none() && top_right.is_none())
            || (bottom_left.is_none() && bottom_right.is_none())
            || (top_left.is_some() && bottom_left.is_none())
            || (top_right.is_some() && bottom_right.is_none())
        {
            return None;
        }

        let (top_left, bottom_left) = match top_left {
            Some(tl) => (tl, bottom_left.unwrap()),
            None => {
                let tr = top_right.unwrap();
                let br = bottom_right.unwrap();
                (Point::new(0.0, tr.y), Point::new(0.0, br.y))
            }
        };
        let (top_right, bottom_right) = match top_right {
            Some(tr) => (tr, bottom_right.unwrap()),
            None => {
                let edge = (img_width - 1) as f32;
                (Point::new(edge, top_left.y), Point::new(edge, bottom_left.y))
            }
        };

        let min_x = top_left.x.min(bottom_left.x) as i32;
        let max_x = top_right.x.max(bottom_right.x) as i32;
        let min_y = top_left.y.min(top_right.y) as i32;
        let max_y = bottom_left.y.max(bottom_right.y) as i32;

        Some(BoundingBox {
            img_width,
            img_height,
            top_left,
            bottom_left,
            top_right,
            bottom_right,
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    pub fn min_x(&self) -> i32 {
        self.min_x
    }
    pub fn max_x(&self) -> i32 {
        self.max_x
    }
    pub fn min_y(&self) -> i32 {
        self.min_y
    }
    pub fn max_y(&self) -> i32 {
        self.max_y
    }
    pub fn top_left(&self) -> Point {
        self.top_left
    }
    pub fn top_right(&self) -> Point {
        self.top_right
    }
    pub fn bottom_left(&self) -> Point {
        self.bottom_left
    }
    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    /// Extends the box vertically by `missing_start_rows`/`missing_end_rows` on whichever side
    /// (`is_left`) the caller is adjusting, clamped to the image bounds.
    pub fn add_missing_rows(&self, missing_start_rows: i32, missing_end_rows: i32, is_left: bool) -> Option<BoundingBox> {
        let mut new_top_left = self.top_left;
        let mut new_bottom_left = self.bottom_left;
        let mut new_top_right = self.top_right;
        let mut new_bottom_right = self.bottom_right;

        if missing_start_rows > 0 {
            let top = if is_left { self.top_left } else { self.top_right };
            let new_min_y = (top.y as i32 - missing_start_rows).max(0);
            let new_top = Point::new(top.x, new_min_y as f32);
            if is_left {
                new_top_left = new_top;
            } else {
                new_top_right = new_top;
            }
        }

        if missing_end_rows > 0 {
            let bottom = if is_left { self.bottom_left } else { self.bottom_right };
            let new_max_y = (bottom.y as i32 + missing_end_rows).min(self.img_height - 1);
            let new_bottom = Point::new(bottom.x, new_max_y as f32);
            if is_left {
                new_bottom_left = new_bottom;
            } else {
                new_bottom_right = new_bottom;
            }
        }

        BoundingBox::create(self.img_width, self.img_height, Some(new_top_left), Some(new_bottom_left), Some(new_top_right), Some(new_bottom_right))
    }
}
