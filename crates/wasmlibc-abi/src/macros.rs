//! Helper macros for ABI function generation.

/// Generate a `#[unsafe(no_mangle)] pub unsafe extern "C" fn` export.
///
/// ```ignore
/// abi_fn! {
///     /// Doc comment for the function.
///     fn wasmlibc_example(arg1: Type1, arg2: Type2) -> ReturnType {
///         // body, already inside an unsafe block
///     }
/// }
/// ```
macro_rules! abi_fn {
    (
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? ) -> $ret:ty
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name( $($arg : $argty),* ) -> $ret {
            unsafe { $body }
        }
    };

    // Variant without return type (returns ())
    (
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? )
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name( $($arg : $argty),* ) {
            unsafe { $body }
        }
    };
}
