/// Forwards a `std::ops` trait on a one-field tuple struct to the wrapped value.
///
/// * `binary` for `Add`, `Sub` and friends, e.g. `op!(binary Points, Add, add)`.
/// * `inplace` for the `*Assign` traits.
/// * `unary` for `Neg` and `Not`.
///
/// The trait must be in scope where the macro is invoked.
#[macro_export]
macro_rules! op {
    (binary $newtype:ident, $op_trait:ident, $method:ident) => {
        impl $op_trait for $newtype {
            type Output = $newtype;

            #[inline]
            fn $method(self, other: $newtype) -> $newtype {
                $newtype($op_trait::$method(self.0, other.0))
            }
        }
    };
    (inplace $newtype:ident, $op_trait:ident, $method:ident) => {
        impl $op_trait for $newtype {
            #[inline]
            fn $method(&mut self, other: $newtype) {
                $op_trait::$method(&mut self.0, other.0);
            }
        }
    };
    (unary $newtype:ident, $op_trait:ident, $method:ident) => {
        impl $op_trait for $newtype {
            type Output = $newtype;

            #[inline]
            fn $method(self) -> $newtype {
                $newtype($op_trait::$method(self.0))
            }
        }
    };
}
