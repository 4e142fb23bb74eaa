use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Error};

/// Add the derives every model needs and keep the rest of the item as written
pub fn model_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return Error::new(
            proc_macro2::Span::call_site(),
            "model takes no arguments; use #[table(name = \"...\")] for the table name",
        )
        .to_compile_error()
        .into();
    }

    let mut input = parse_macro_input!(item as DeriveInput);

    if !matches!(input.data, Data::Struct(_)) {
        return Error::new_spanned(&input.ident, "model can only be used on structs")
            .to_compile_error()
            .into();
    }

    let derives: Attribute = parse_quote! {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::sqlx::FromRow,
            ::table_derive::TableMetadata
        )]
    };
    input.attrs.insert(0, derives);

    TokenStream::from(quote!(#input))
}
