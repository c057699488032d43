use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use size_of::SizeOf;
use std::{
    fmt::{self, Debug, Display},
    num::ParseFloatError,
    str::FromStr,
};

macro_rules! float {
    ($($outer:ident($inner:ident)),* $(,)?) => {
        $(
            #[doc = concat!("A totally ordered wrapper around [`", stringify!($inner), "`] that can be stored in an order-statistic store.")]
            ///
            /// NaN sorts above every other value and compares equal to itself.
            #[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SizeOf)]
            #[derive(Serialize, Deserialize)]
            #[repr(transparent)]
            #[size_of(skip_all)]
            #[serde(transparent)]
            pub struct $outer(OrderedFloat<$inner>);

            impl $outer {
                #[inline]
                pub const fn new(float: $inner) -> Self {
                    Self(OrderedFloat(float))
                }

                #[inline]
                #[rustfmt::skip]
                pub const fn into_inner(self) -> $inner {
                    self.0.0
                }
            }

            impl From<$inner> for $outer {
                #[inline]
                fn from(x: $inner) -> Self {
                    Self::new(x)
                }
            }

            impl From<$outer> for $inner {
                #[inline]
                fn from(x: $outer) -> Self {
                    x.into_inner()
                }
            }

            impl PartialEq<$inner> for $outer {
                #[inline]
                fn eq(&self, other: &$inner) -> bool {
                    *self == $outer::new(*other)
                }
            }

            impl PartialEq<$outer> for $inner {
                #[inline]
                fn eq(&self, other: &$outer) -> bool {
                    $outer::new(*self) == *other
                }
            }

            impl FromStr for $outer {
                type Err = ParseFloatError;

                #[inline]
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    $inner::from_str(s).map(Self::new)
                }
            }

            impl Debug for $outer {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    Debug::fmt(&self.into_inner(), f)
                }
            }

            impl Display for $outer {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    Display::fmt(&self.into_inner(), f)
                }
            }
        )*
    };
}

float! {
    F32(f32),
    F64(f64),
}

#[cfg(test)]
mod tests {
    use super::{F32, F64};

    #[test]
    fn nan_sorts_last() {
        let mut values = vec![F64::new(f64::NAN), F64::new(1.0), F64::new(-3.5)];
        values.sort();
        assert_eq!(values[0], -3.5);
        assert_eq!(values[1], 1.0);
        assert!(values[2].into_inner().is_nan());
        assert_eq!(F64::new(f64::NAN), F64::new(f64::NAN));
    }

    #[test]
    fn conversions() {
        assert_eq!(F32::from(2.5f32).into_inner(), 2.5);
        assert_eq!(f32::from(F32::new(-1.0)), -1.0);
        assert_eq!("0.125".parse::<F64>().unwrap(), 0.125);
        assert_eq!(format!("{:?}", F64::new(8.5)), "8.5");
        assert_eq!(F32::new(1.0).to_string(), "1");
    }
}
