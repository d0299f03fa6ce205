// Copyright 2026 the Palimpsest Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Optional 2-D affine transforms.
//!
//! Elements carry `Option<Affine>`, where `None` means identity. These
//! helpers compare and compose such values without allocating an identity
//! matrix at every call site.

use kurbo::Affine;

/// Returns the coefficients of `transform`, treating `None` as identity.
#[inline]
#[must_use]
pub fn coeffs(transform: Option<&Affine>) -> [f64; 6] {
    transform.map_or(Affine::IDENTITY, |t| *t).as_coeffs()
}

/// Component-wise equality of two optional transforms.
///
/// `None` and an explicit identity compare equal.
#[must_use]
pub fn same_transform(a: Option<&Affine>, b: Option<&Affine>) -> bool {
    coeffs(a) == coeffs(b)
}

/// Returns `true` if `transform` collapses both axes to zero.
///
/// Such elements have no visible extent and are culled before replay.
#[must_use]
pub fn is_zero_scale(transform: Option<&Affine>) -> bool {
    match transform {
        Some(t) => {
            let [a, b, c, d, _, _] = t.as_coeffs();
            a == 0.0 && b == 0.0 && c == 0.0 && d == 0.0
        }
        None => false,
    }
}

/// Composes the device-pixel-ratio scale with an element transform.
#[inline]
#[must_use]
pub fn device_transform(dpr: f64, transform: Option<&Affine>) -> Affine {
    Affine::scale(dpr) * transform.map_or(Affine::IDENTITY, |t| *t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_equals_identity() {
        assert!(same_transform(None, Some(&Affine::IDENTITY)));
        assert!(same_transform(None, None));
    }

    #[test]
    fn translation_differs() {
        let t = Affine::translate((1.0, 0.0));
        assert!(!same_transform(None, Some(&t)));
        assert!(same_transform(Some(&t), Some(&Affine::translate((1.0, 0.0)))));
    }

    #[test]
    fn zero_scale_detection() {
        assert!(is_zero_scale(Some(&Affine::scale(0.0))));
        assert!(!is_zero_scale(Some(&Affine::scale_non_uniform(0.0, 1.0))));
        // A quarter turn has zero diagonal entries but is not degenerate.
        assert!(!is_zero_scale(Some(&Affine::rotate(
            core::f64::consts::FRAC_PI_2
        ))));
        assert!(!is_zero_scale(None));
    }

    #[test]
    fn device_transform_prepends_scale() {
        let t = Affine::translate((3.0, 4.0));
        let d = device_transform(2.0, Some(&t));
        assert_eq!(d.as_coeffs(), [2.0, 0.0, 0.0, 2.0, 6.0, 8.0]);
        assert_eq!(device_transform(1.5, None), Affine::scale(1.5));
    }
}
