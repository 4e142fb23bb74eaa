//! Code generation for `TableMetadata`
//!
//! Builds the DDL strings at expansion time and emits the trait impl and the
//! insert draft.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, Error, Ident, Result, Visibility};

use crate::parsing::{parse_field_attributes, parse_table_attributes, ColumnInfo, FieldInfo, TableInfo};

/// PostgreSQL column type for a Rust field type (whitespace removed)
pub fn rust_type_to_pg_type(rust_type: &str) -> Option<&'static str> {
    match rust_type {
        "Id" | "i64" => Some("BIGINT"),
        "i32" => Some("INTEGER"),
        "String" => Some("TEXT"),
        "bool" => Some("BOOLEAN"),
        "DateTime<Utc>" | "chrono::DateTime<chrono::Utc>" => Some("TIMESTAMPTZ"),
        _ => None,
    }
}

fn optional_inner(type_string: &str) -> Option<&str> {
    type_string
        .strip_prefix("Option<")
        .and_then(|rest| rest.strip_suffix('>'))
}

fn column_definition(column: &ColumnInfo) -> Result<String> {
    let name = column.name();
    if column.primary_key {
        return Ok(format!("{} BIGSERIAL PRIMARY KEY", name));
    }

    let (inner, nullable) = match optional_inner(&column.type_string) {
        Some(inner) => (inner, true),
        None => (column.type_string.as_str(), false),
    };
    let sql_type = match &column.sql_type {
        Some(sql_type) => sql_type.clone(),
        None => rust_type_to_pg_type(inner)
            .ok_or_else(|| {
                Error::new_spanned(
                    &column.ty,
                    format!(
                        "no PostgreSQL type for '{}'; add #[column(sql_type = \"...\")]",
                        inner
                    ),
                )
            })?
            .to_string(),
    };

    let mut definition = format!("{} {}", name, sql_type);
    if !nullable {
        definition.push_str(" NOT NULL");
        if !column.create {
            // Row timestamps are filled in by the database
            if sql_type != "TIMESTAMPTZ" {
                return Err(Error::new(
                    column.ident.span(),
                    format!("'{}' is not a create field and has no default", name),
                ));
            }
            definition.push_str(" DEFAULT NOW()");
        }
    }
    if let Some(table) = &column.references {
        definition.push_str(&format!(" REFERENCES {} (id)", table));
    }
    if let Some(check) = &column.check {
        definition.push_str(&format!(" CHECK ({})", check));
    }

    Ok(definition)
}

pub fn create_table_sql(table_info: &TableInfo, field_info: &FieldInfo) -> Result<String> {
    let definitions = field_info
        .columns
        .iter()
        .map(column_definition)
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        table_info.name,
        definitions.join(",\n    ")
    ))
}

pub fn create_indexes_sql(table_info: &TableInfo, field_info: &FieldInfo) -> Vec<String> {
    let table = &table_info.name;
    let composite = table_info.composite_indexes.iter().cloned();
    let single = field_info
        .columns
        .iter()
        .filter(|c| c.indexed)
        .map(|c| vec![c.name()]);

    composite
        .chain(single)
        .map(|fields| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {} ({})",
                table,
                fields.join("_"),
                table,
                fields.join(", ")
            )
        })
        .collect()
}

fn generate_draft(name: &Ident, vis: &Visibility, field_info: &FieldInfo) -> (Ident, TokenStream) {
    let draft = format_ident!("New{}", name);
    let doc = format!("Insert payload for [`{}`]", name);
    let idents: Vec<&Ident> = field_info.create_columns().map(|c| &c.ident).collect();
    let types: Vec<&syn::Type> = field_info.create_columns().map(|c| &c.ty).collect();
    let names: Vec<String> = field_info.create_columns().map(ColumnInfo::name).collect();

    let tokens = quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq)]
        #vis struct #draft {
            #( pub #idents: #types, )*
        }

        impl ::store_object::Insertable for #draft {
            fn values(&self) -> ::std::vec::Vec<(&'static str, ::store_object::SqlValue)> {
                ::std::vec![
                    #( (#names, ::store_object::SqlValue::from(::std::clone::Clone::clone(&self.#idents))), )*
                ]
            }
        }
    };

    (draft, tokens)
}

pub fn generate_table_metadata_impl(
    name: &Ident,
    vis: &Visibility,
    table_info: &TableInfo,
    field_info: &FieldInfo,
) -> Result<TokenStream> {
    let table_name = &table_info.name;
    let column_names: Vec<String> = field_info.columns.iter().map(ColumnInfo::name).collect();
    let primary_key = &field_info.primary_key_field;
    let primary_key_name = primary_key.to_string();
    let soft_delete = match &field_info.soft_delete_field {
        Some(field) => quote!(::std::option::Option::Some(#field)),
        None => quote!(::std::option::Option::None),
    };
    let create_sql = create_table_sql(table_info, field_info)?;
    let indexes = create_indexes_sql(table_info, field_info);
    let (draft, draft_tokens) = generate_draft(name, vis, field_info);

    Ok(quote! {
        #draft_tokens

        impl ::store_object::TableMetadata for #name {
            type Draft = #draft;

            fn table_name() -> &'static str {
                #table_name
            }

            fn columns() -> &'static [&'static str] {
                &[#(#column_names),*]
            }

            fn soft_delete_field() -> ::std::option::Option<&'static str> {
                #soft_delete
            }

            fn primary_key_field() -> &'static str {
                #primary_key_name
            }

            fn extract_id(&self) -> ::store_object::Id {
                self.#primary_key
            }

            fn create_table_sql() -> ::std::string::String {
                ::std::string::String::from(#create_sql)
            }

            fn create_indexes_sql() -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::string::String::from(#indexes)),*]
            }
        }
    })
}

pub fn expand_table_metadata(input: &DeriveInput) -> Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "TableMetadata cannot be derived for generic structs",
        ));
    }

    let table_info = parse_table_attributes(&input.attrs)?;
    let field_info = parse_field_attributes(&input.data, &table_info)?;

    generate_table_metadata_impl(&input.ident, &input.vis, &table_info, &field_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parsed(input: &DeriveInput) -> (TableInfo, FieldInfo) {
        let table = parse_table_attributes(&input.attrs).unwrap();
        let fields = parse_field_attributes(&input.data, &table).unwrap();
        (table, fields)
    }

    fn post() -> DeriveInput {
        parse_quote! {
            #[table(name = "posts")]
            pub struct Post {
                #[primary_key]
                pub id: Id,
                #[field(create)]
                pub title: String,
                #[field(create)]
                #[index]
                #[column(references = "users")]
                pub user_id: Id,
                pub created_at: DateTime<Utc>,
                #[soft_delete]
                #[index]
                pub deleted_at: Option<DateTime<Utc>>,
            }
        }
    }

    #[test]
    fn test_create_table_sql() {
        let (table, fields) = parsed(&post());
        assert_eq!(
            create_table_sql(&table, &fields).unwrap(),
            "CREATE TABLE IF NOT EXISTS posts (\n    \
             id BIGSERIAL PRIMARY KEY,\n    \
             title TEXT NOT NULL,\n    \
             user_id BIGINT NOT NULL REFERENCES users (id),\n    \
             created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),\n    \
             deleted_at TIMESTAMPTZ\n)"
        );
    }

    #[test]
    fn test_create_indexes_sql() {
        let input: DeriveInput = parse_quote! {
            #[table(name = "replies")]
            #[index(parent_type, parent_id)]
            struct Reply {
                #[primary_key]
                id: Id,
                #[field(create)]
                #[column(sql_type = "TEXT")]
                parent_type: ParentKind,
                #[field(create)]
                parent_id: Id,
                #[soft_delete]
                #[index]
                deleted_at: Option<DateTime<Utc>>,
            }
        };
        let (table, fields) = parsed(&input);
        assert_eq!(
            create_indexes_sql(&table, &fields),
            vec![
                "CREATE INDEX IF NOT EXISTS idx_replies_parent_type_parent_id ON replies (parent_type, parent_id)",
                "CREATE INDEX IF NOT EXISTS idx_replies_deleted_at ON replies (deleted_at)",
            ]
        );
    }

    #[test]
    fn test_check_constraint_and_explicit_type() {
        let input: DeriveInput = parse_quote! {
            #[table(name = "replies")]
            struct Reply {
                #[primary_key]
                id: Id,
                #[field(create)]
                #[column(sql_type = "TEXT", check = "parent_type IN ('Post', 'Reply')")]
                parent_type: ParentKind,
            }
        };
        let (table, fields) = parsed(&input);
        let sql = create_table_sql(&table, &fields).unwrap();
        assert!(sql.contains("parent_type TEXT NOT NULL CHECK (parent_type IN ('Post', 'Reply'))"));
    }

    #[test]
    fn test_unmapped_type_needs_sql_type() {
        let input: DeriveInput = parse_quote! {
            #[table(name = "replies")]
            struct Reply {
                #[primary_key]
                id: Id,
                #[field(create)]
                parent_type: ParentKind,
            }
        };
        let (table, fields) = parsed(&input);
        let err = create_table_sql(&table, &fields).unwrap_err();
        assert!(err.to_string().contains("no PostgreSQL type for 'ParentKind'"));
    }

    #[test]
    fn test_required_column_needs_default() {
        let input: DeriveInput = parse_quote! {
            #[table(name = "things")]
            struct Thing {
                #[primary_key]
                id: Id,
                name: String,
            }
        };
        let (table, fields) = parsed(&input);
        let err = create_table_sql(&table, &fields).unwrap_err();
        assert!(err.to_string().contains("'name' is not a create field"));
    }

    #[test]
    fn test_expansion_emits_draft_and_impl() {
        let expanded = expand_table_metadata(&post()).unwrap().to_string();
        assert!(expanded.contains("pub struct NewPost"));
        assert!(expanded.contains("impl :: store_object :: TableMetadata for Post"));
        assert!(expanded.contains("type Draft = NewPost"));
        assert!(expanded.contains("pub title : String"));
        assert!(!expanded.contains("pub created_at"));
    }

    #[test]
    fn test_generic_structs_rejected() {
        let input: DeriveInput = parse_quote! {
            #[table(name = "things")]
            struct Thing<T> {
                #[primary_key]
                id: Id,
                value: T,
            }
        };
        let err = expand_table_metadata(&input).unwrap_err();
        assert!(err.to_string().contains("generic structs"));
    }
}
