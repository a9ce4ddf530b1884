mod component;

use proc_macro::TokenStream;

/// Implement `packed_ecs::ecs::Component` for a struct or enum.
#[proc_macro_derive(Component)]
pub fn derive_component(item: TokenStream) -> TokenStream {
    component::derive_component(item)
}
