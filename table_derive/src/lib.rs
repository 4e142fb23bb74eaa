//! Procedural macros for generating table metadata
//!
//! This crate provides the `#[model]` macro and `TableMetadata` derive used by
//! the commentable models. The derive emits the `store_object::TableMetadata`
//! impl, an insert draft named `New<Model>` and the table DDL.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod model_macro;
mod parsing;
mod sql_generation;

use model_macro::model_attribute;
use sql_generation::expand_table_metadata;

/// Derive macro for the `TableMetadata` trait
///
/// Prefer the `#[model]` attribute, which adds this derive together with the
/// other derives a model needs.
///
/// ```ignore
/// #[model]
/// #[table(name = "posts")]
/// pub struct Post {
///     #[primary_key]
///     pub id: Id,
///
///     #[field(create)]
///     pub title: String,
///
///     #[field(create)]
///     #[index]
///     #[column(references = "users")]
///     pub user_id: Id,
///
///     pub created_at: DateTime<Utc>,
///     pub updated_at: DateTime<Utc>,
///
///     #[soft_delete]
///     pub deleted_at: Option<DateTime<Utc>>,
/// }
/// ```
///
/// Fields marked `#[field(create)]` become the fields of `NewPost`. Columns
/// not supplied on create must be nullable or timestamps, which default to
/// `NOW()`.
#[proc_macro_derive(
    TableMetadata,
    attributes(table, primary_key, field, soft_delete, index, column)
)]
pub fn derive_table_metadata(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_table_metadata(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Convenience attribute macro that adds all necessary derives for a database model
///
/// ```ignore
/// #[model]
/// #[table(name = "users")]
/// pub struct User {
///     #[primary_key]
///     pub id: Id,
///     #[field(create)]
///     pub name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(attr, item)
}
