/// Invoke a macro once per tuple arity, peeling the head type off each time.
///
/// `for_every_tuple!(m !! A, B, C)` expands to `m!(A, B, C); m!(B, C); m!(C);`.
#[macro_export]
macro_rules! for_every_tuple {
    ($m:ident !! $head_ty:ident) => {
        $m!($head_ty);
    };
    ($m:ident !! $head_ty:ident, $($tail_ty:ident),*) => (
        $m!($head_ty, $( $tail_ty ),*);
        $crate::for_every_tuple!($m !! $( $tail_ty ),*);
    );
}

/// Apply a macro to every tuple arity from 1 to 12.
///
/// Joins and component sets are tuples of component types, twelve covers any realistic system.
#[macro_export]
macro_rules! all_tuples {
    ($m:ident) => {
        $crate::for_every_tuple!($m !! A, B, C, D, E, F, G, H, I, J, K, L);
    };
}
