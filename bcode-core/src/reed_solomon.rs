// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A generic Reed-Solomon decoder over any [`GaloisField`], shared by the Data Matrix
//! (`GF(2^8)`) and PDF417 (`GF(929)`) symbology crates.

use crate::errors::{checksum_error, Result};
use crate::field::{GaloisField, Polynomial};

/// Corrects `received` in place against `num_ec_codewords` error-correction codewords, using
/// syndrome decoding, the extended Euclidean algorithm, Chien search, and Forney's formula.
///
/// `received` holds the full codeword sequence (data followed by error-correction codewords) in
/// transmission order. On success every corrected position has been updated in place. Returns a
/// [`crate::errors::Error::Checksum`] if the errors present exceed what `num_ec_codewords` can
/// correct.
pub fn decode(field: &GaloisField, received: &mut [i32], num_ec_codewords: usize) -> Result<()> {
    let poly = Polynomial::new(received.iter().copied().collect());
    let two_s = num_ec_codewords as i32;

    let mut syndrome_coefficients = vec![0i32; num_ec_codewords];
    let mut no_error = true;
    for i in 0..two_s {
        let eval = poly.evaluate_at(field.exp(i + field.generator_base()), field);
        syndrome_coefficients[num_ec_codewords - 1 - i as usize] = eval;
        if eval != 0 {
            no_error = false;
        }
    }
    if no_error {
        return Ok(());
    }

    let syndrome = Polynomial::new(syndrome_coefficients);
    let monomial = field.build_monomial(two_s, 1);
    let (sigma, omega) = run_euclidean_algorithm(field, &monomial, &syndrome, two_s)?;
    let error_locations = find_error_locations(field, &sigma)?;
    let error_magnitudes = find_error_magnitudes(field, &omega, &error_locations);

    for i in 0..error_locations.len() {
        let log = field.log(error_locations[i])?;
        let position = received.len() as i32 - 1 - log;
        if position < 0 {
            return checksum_error("reed_solomon::decode: bad error location");
        }
        received[position as usize] = field.subtract(received[position as usize], error_magnitudes[i]);
    }
    Ok(())
}

/// As [`decode`], but for callers (PDF417) that have already localized some positions as
/// erasures. The original decoder this one is modeled on accepts an erasure list purely to bound
/// how many further errors can be tolerated; it never folds the erasure positions into the
/// syndrome computation itself, so this wrapper mirrors that: it checks the combined budget and
/// then defers to the same syndrome-based correction as `decode`.
pub fn decode_with_erasures(
    field: &GaloisField,
    received: &mut [i32],
    num_ec_codewords: usize,
    erasure_count: usize,
) -> Result<()> {
    if erasure_count > num_ec_codewords {
        return checksum_error("reed_solomon::decode_with_erasures: too many erasures");
    }
    decode(field, received, num_ec_codewords)
}

fn run_euclidean_algorithm(
    field: &GaloisField,
    a: &Polynomial,
    b: &Polynomial,
    r: i32,
) -> Result<(Polynomial, Polynomial)> {
    let (mut r_last, mut r_cur) = if a.degree() < b.degree() {
        (b.clone(), a.clone())
    } else {
        (a.clone(), b.clone())
    };

    let mut t_last = field.zero();
    let mut t_cur = field.one();

    while r_cur.degree() >= r / 2 {
        let r_last_last = r_last;
        let t_last_last = t_last;
        r_last = r_cur;
        t_last = t_cur;

        if r_last.is_zero() {
            return checksum_error("reed_solomon: r_{i-1} was zero");
        }
        r_cur = r_last_last;
        let mut q = field.zero();
        let denominator_leading_term = r_last.coefficient(r_last.degree());
        let dlt_inverse = field.inverse(denominator_leading_term)?;

        while r_cur.degree() >= r_last.degree() && !r_cur.is_zero() {
            let degree_diff = r_cur.degree() - r_last.degree();
            let scale = field.multiply(r_cur.coefficient(r_cur.degree()), dlt_inverse);
            q = q.add_or_subtract(&field.build_monomial(degree_diff, scale), field);
            r_cur = r_cur.add_or_subtract(&r_last.multiply_by_monomial(degree_diff, scale, field), field);
        }

        t_cur = q.multiply(&t_last, field).add_or_subtract(&t_last_last, field);

        if r_cur.degree() >= r_last.degree() {
            return checksum_error("reed_solomon: division algorithm failed to reduce polynomial");
        }
    }

    let sigma_tilde_at_zero = t_cur.coefficient(0);
    if sigma_tilde_at_zero == 0 {
        return checksum_error("reed_solomon: sigmaTilde(0) was zero");
    }

    let inverse = field.inverse(sigma_tilde_at_zero)?;
    let sigma = t_cur.multiply_scalar(inverse, field);
    let omega = r_cur.multiply_scalar(inverse, field);
    Ok((sigma, omega))
}

fn find_error_locations(field: &GaloisField, error_locator: &Polynomial) -> Result<Vec<i32>> {
    let num_errors = error_locator.degree();
    if num_errors == 1 {
        return Ok(vec![error_locator.coefficient(1)]);
    }
    let mut result = vec![0i32; num_errors as usize];
    let mut e = 0usize;
    for i in 1..field.size() {
        if e >= num_errors as usize {
            break;
        }
        if error_locator.evaluate_at(i, field) == 0 {
            result[e] = field.inverse(i)?;
            e += 1;
        }
    }
    if e != num_errors as usize {
        return checksum_error("reed_solomon: error locator degree does not match number of roots");
    }
    Ok(result)
}

fn find_error_magnitudes(field: &GaloisField, error_evaluator: &Polynomial, error_locations: &[i32]) -> Vec<i32> {
    let s = error_locations.len();
    let mut result = vec![0i32; s];
    for i in 0..s {
        let xi_inverse = field.inverse(error_locations[i]).expect("error location is nonzero");
        let mut denominator = 1;
        for (j, &loc) in error_locations.iter().enumerate() {
            if i != j {
                let term = field.multiply(loc, xi_inverse);
                let term_plus_1 = field.add(1, term);
                denominator = field.multiply(denominator, term_plus_1);
            }
        }
        result[i] = field.multiply(
            error_evaluator.evaluate_at(xi_inverse, field),
            field.inverse(denominator).expect("denominator is nonzero for distinct error locations"),
        );
        if field.generator_base() != 0 {
            result[i] = field.multiply(result[i], xi_inverse);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dm_field() -> GaloisField {
        GaloisField::new_binary(0x012D, 2, 256, 1)
    }

    fn pdf_field() -> GaloisField {
        GaloisField::new_prime(929, 3, 0)
    }

    fn encode(field: &GaloisField, data: &[i32], num_ec: usize) -> Vec<i32> {
        let mut generator = field.one();
        for i in 0..num_ec as i32 {
            generator = generator.multiply(
                &Polynomial::new(vec![1, field.exp(i + field.generator_base())]),
                field,
            );
        }
        let info_coefficients = data.to_vec();
        let info = Polynomial::new(info_coefficients);
        let info_padded = info.multiply_by_monomial(num_ec as i32, 1, field);
        let (_, remainder) = divide(field, &info_padded, &generator);
        let mut result = data.to_vec();
        let mut ec = vec![0i32; num_ec];
        for i in 0..num_ec as i32 {
            ec[i as usize] = remainder.coefficient(num_ec as i32 - 1 - i);
        }
        result.extend(ec);
        result
    }

    fn divide(field: &GaloisField, dividend: &Polynomial, divisor: &Polynomial) -> (Polynomial, Polynomial) {
        let mut quotient = field.zero();
        let mut remainder = dividend.clone();
        let divisor_leading = divisor.coefficient(divisor.degree());
        let inverse = field.inverse(divisor_leading).unwrap();
        while remainder.degree() >= divisor.degree() && !remainder.is_zero() {
            let degree_diff = remainder.degree() - divisor.degree();
            let scale = field.multiply(remainder.coefficient(remainder.degree()), inverse);
            let term = field.build_monomial(degree_diff, scale);
            quotient = quotient.add_or_subtract(&term, field);
            remainder = remainder.add_or_subtract(&divisor.multiply_by_monomial(degree_diff, scale, field), field);
        }
        (quotient, remainder)
    }

    #[test]
    fn corrects_a_single_substitution_error_binary_field() {
        let field = dm_field();
        let data = vec![65, 66, 67, 68, 69, 70];
        let mut codewords = encode(&field, &data, 8);
        codewords[3] ^= 0xFF;
        decode(&field, &mut codewords, 8).unwrap();
        assert_eq!(&codewords[..data.len()], &data[..]);
    }

    #[test]
    fn corrects_two_substitution_errors_prime_field() {
        let field = pdf_field();
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let mut codewords = encode(&field, &data, 8);
        codewords[0] = (codewords[0] + 500) % 929;
        codewords[6] = (codewords[6] + 17) % 929;
        decode(&field, &mut codewords, 8).unwrap();
        assert_eq!(&codewords[..data.len()], &data[..]);
    }

    #[test]
    fn leaves_an_uncorrupted_message_untouched() {
        let field = dm_field();
        let data = vec![10, 20, 30, 40];
        let codewords = encode(&field, &data, 6);
        let mut copy = codewords.clone();
        decode(&field, &mut copy, 6).unwrap();
        assert_eq!(copy, codewords);
    }

    #[test]
    fn too_many_errors_reports_a_checksum_error() {
        let field = dm_field();
        let data = vec![1, 2, 3];
        let mut codewords = encode(&field, &data, 4);
        for c in codewords.iter_mut() {
            *c ^= 0xAA;
        }
        assert!(decode(&field, &mut codewords, 4).is_err());
    }
}
