//! Parsing utilities for table and field attributes
//!
//! Handles `#[table]`, `#[index]`, `#[field]`, `#[column]` and the marker
//! attributes, and validates table and column names.

use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, Attribute, Data, Error, Fields, Ident, LitStr, Meta, Result,
    Token,
};

/// Validate table name and return syn::Error for better proc macro error handling
pub fn validate_table_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid table name '{}': {}", name, e)))
}

/// Validate field name and return syn::Error for better proc macro error handling
pub fn validate_field_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid field name '{}': {}", name, e)))
}

fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    // PostgreSQL limit
    if name.len() > 63 {
        return Err(format!(
            "Name '{}' is too long: {} characters (max 63)",
            name,
            name.len()
        ));
    }

    let first_char = name
        .chars()
        .next()
        .ok_or_else(|| "Name cannot be empty".to_string())?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(format!(
            "Name '{}' must start with a letter or underscore",
            name
        ));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Name '{}' contains invalid characters: only alphanumeric characters and underscores are allowed", name));
    }

    if is_reserved_keyword(name) {
        return Err(format!("Name '{}' is a reserved SQL keyword", name));
    }

    Ok(())
}

/// Check if a name is a reserved SQL keyword
fn is_reserved_keyword(name: &str) -> bool {
    const RESERVED_KEYWORDS: &[&str] = &[
        "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "JOIN", "INNER", "LEFT",
        "RIGHT", "FULL", "OUTER", "ON", "AS", "AND", "OR", "NOT", "NULL", "TRUE", "FALSE",
        "CASE", "WHEN", "THEN", "ELSE", "END", "IF", "EXISTS", "IN", "LIKE", "BETWEEN", "ORDER",
        "BY", "GROUP", "HAVING", "LIMIT", "OFFSET", "UNION", "ALL", "DISTINCT", "CREATE", "DROP",
        "ALTER", "TABLE", "INDEX", "VIEW", "DATABASE", "SCHEMA", "PRIMARY", "KEY", "FOREIGN",
        "REFERENCES", "UNIQUE", "CHECK", "DEFAULT", "CONSTRAINT", "COLUMN", "ADD", "RENAME",
        "TO", "USER",
        // PostgreSQL specific keywords
        "BIGSERIAL", "TEXT", "BIGINT", "INTEGER", "BOOLEAN", "TIMESTAMP", "TIMESTAMPTZ",
        "RETURNING", "CONFLICT", "TRIGGER", "FUNCTION",
    ];

    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

#[derive(Debug)]
struct FieldOperations {
    operations: Vec<Ident>,
}

impl Parse for FieldOperations {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut operations = Vec::new();

        while !input.is_empty() {
            let op: Ident = input.parse()?;
            operations.push(op);

            if input.peek(Token![,]) {
                let _: Token![,] = input.parse()?;
            }
        }

        Ok(FieldOperations { operations })
    }
}

#[derive(Debug)]
pub struct TableInfo {
    pub name: String,
    pub composite_indexes: Vec<Vec<String>>, // #[index(field1, field2)]
}

/// One struct field and the column it maps to
pub struct ColumnInfo {
    pub ident: Ident,
    pub ty: syn::Type,
    /// Rust type with whitespace removed
    pub type_string: String,
    pub primary_key: bool,
    pub create: bool,
    pub indexed: bool,
    pub sql_type: Option<String>,
    pub references: Option<String>,
    pub check: Option<String>,
}

impl ColumnInfo {
    pub fn name(&self) -> String {
        self.ident.to_string()
    }
}

pub struct FieldInfo {
    pub columns: Vec<ColumnInfo>,
    pub primary_key_field: Ident,
    pub soft_delete_field: Option<String>,
}

impl FieldInfo {
    pub fn create_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| c.create)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.ident == name)
    }
}

pub fn parse_table_attributes(attrs: &[Attribute]) -> Result<TableInfo> {
    let mut table_name = None;
    let mut composite_indexes = Vec::new();

    for attr in attrs {
        if attr.path().is_ident("table") {
            if let Meta::List(meta_list) = &attr.meta {
                let mut tokens = meta_list.tokens.clone().into_iter().peekable();

                while let Some(token) = tokens.next() {
                    if let proc_macro2::TokenTree::Ident(key) = token {
                        // Expect '=' after key
                        if let Some(proc_macro2::TokenTree::Punct(punct)) = tokens.peek() {
                            if punct.as_char() == '=' {
                                tokens.next();

                                if let Some(proc_macro2::TokenTree::Literal(lit)) = tokens.next() {
                                    let value = lit.to_string().trim_matches('"').to_string();

                                    match key.to_string().as_str() {
                                        "name" => table_name = Some(value),
                                        other => {
                                            return Err(Error::new(
                                                key.span(),
                                                format!("unknown table option '{}'", other),
                                            ))
                                        }
                                    }
                                }
                            }
                        }

                        if let Some(proc_macro2::TokenTree::Punct(punct)) = tokens.peek() {
                            if punct.as_char() == ',' {
                                tokens.next();
                            }
                        }
                    }
                }
            }
        } else if attr.path().is_ident("index") {
            if let Meta::List(meta_list) = &attr.meta {
                composite_indexes.push(parse_field_list(&meta_list.tokens)?);
            }
        }
    }

    let table_name = table_name.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            "table attribute is required: add #[table(name = \"table_name\")] to your struct",
        )
    })?;

    validate_table_name_syn(&table_name, proc_macro2::Span::call_site())?;

    Ok(TableInfo {
        name: table_name,
        composite_indexes,
    })
}

/// Parse a list of field names from tokens like (field1, field2, field3)
fn parse_field_list(tokens: &proc_macro2::TokenStream) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut tokens_iter = tokens.clone().into_iter().peekable();

    while let Some(token) = tokens_iter.next() {
        if let proc_macro2::TokenTree::Ident(ident) = token {
            fields.push(ident.to_string());
        }

        if let Some(proc_macro2::TokenTree::Punct(punct)) = tokens_iter.peek() {
            if punct.as_char() == ',' {
                tokens_iter.next();
            }
        }
    }

    if fields.is_empty() {
        return Err(Error::new(
            proc_macro2::Span::call_site(),
            "index attribute requires at least one field name",
        ));
    }

    Ok(fields)
}

pub fn parse_field_attributes(data: &Data, table_info: &TableInfo) -> Result<FieldInfo> {
    let Data::Struct(data_struct) = data else {
        return Err(Error::new(
            proc_macro2::Span::call_site(),
            "TableMetadata can only be derived for structs with named fields",
        ));
    };
    let Fields::Named(fields_named) = &data_struct.fields else {
        return Err(Error::new(
            proc_macro2::Span::call_site(),
            "TableMetadata can only be derived for structs with named fields",
        ));
    };

    let mut columns = Vec::new();
    let mut primary_key_field: Option<Ident> = None;
    let mut soft_delete_field = None;

    for field in &fields_named.named {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;
        let field_name_str = field_name.to_string();
        validate_field_name_syn(&field_name_str, field_name.span())?;

        let ty = &field.ty;
        let type_string = quote!(#ty).to_string().replace(' ', "");

        let primary_key = has_attribute(&field.attrs, "primary_key");
        let soft_delete = has_attribute(&field.attrs, "soft_delete");
        let create = parse_field_operations(&field.attrs)?.contains(&"create".to_string());
        let options = parse_column_options(&field.attrs)?;

        if primary_key {
            if primary_key_field.is_some() {
                return Err(Error::new(field_name.span(), "only one #[primary_key] field is allowed"));
            }
            if type_string != "Id" && type_string != "i64" {
                return Err(Error::new_spanned(ty, "primary key must be an `Id` (BIGSERIAL)"));
            }
            primary_key_field = Some(field_name.clone());
        }

        if soft_delete {
            if soft_delete_field.is_some() {
                return Err(Error::new(field_name.span(), "only one #[soft_delete] field is allowed"));
            }
            if !type_string.starts_with("Option<") {
                return Err(Error::new_spanned(
                    ty,
                    "soft delete field must be an `Option<DateTime<Utc>>`",
                ));
            }
            soft_delete_field = Some(field_name_str.clone());
        }

        if create && (primary_key || soft_delete) {
            return Err(Error::new(
                field_name.span(),
                format!("'{}' is maintained by the store and cannot be a create field", field_name_str),
            ));
        }

        columns.push(ColumnInfo {
            ident: field_name.clone(),
            ty: ty.clone(),
            type_string,
            primary_key,
            create,
            indexed: has_attribute(&field.attrs, "index"),
            sql_type: options.sql_type,
            references: options.references,
            check: options.check,
        });
    }

    let primary_key_field = primary_key_field.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            format!("table '{}' needs a #[primary_key] field", table_info.name),
        )
    })?;

    let info = FieldInfo {
        columns,
        primary_key_field,
        soft_delete_field,
    };

    for index in &table_info.composite_indexes {
        if let Some(missing) = index.iter().find(|name| !info.has_column(name)) {
            return Err(Error::new(
                proc_macro2::Span::call_site(),
                format!("index names unknown field '{}'", missing),
            ));
        }
    }

    Ok(info)
}

pub fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// Operations named by `#[field(...)]`; a bare `#[field]` means create
pub fn parse_field_operations(attrs: &[Attribute]) -> Result<Vec<String>> {
    for attr in attrs {
        if attr.path().is_ident("field") {
            return match &attr.meta {
                Meta::List(meta_list) => {
                    let field_ops = meta_list.parse_args::<FieldOperations>()?;
                    let mut operations = Vec::new();
                    for ident in field_ops.operations {
                        match ident.to_string().as_str() {
                            "create" => operations.push("create".to_string()),
                            other => {
                                return Err(Error::new(
                                    ident.span(),
                                    format!("unknown field operation '{}'", other),
                                ))
                            }
                        }
                    }
                    Ok(operations)
                }
                Meta::Path(_) => Ok(vec!["create".to_string()]),
                Meta::NameValue(_) => Err(Error::new_spanned(attr, "expected #[field(create)]")),
            };
        }
    }

    Ok(Vec::new())
}

#[derive(Debug, Default)]
struct ColumnOptions {
    sql_type: Option<String>,
    references: Option<String>,
    check: Option<String>,
}

/// `#[column(sql_type = "...", references = "table", check = "...")]`
fn parse_column_options(attrs: &[Attribute]) -> Result<ColumnOptions> {
    let mut options = ColumnOptions::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("column")) {
        attr.parse_nested_meta(|meta| {
            let value: LitStr = meta.value()?.parse()?;
            if meta.path.is_ident("sql_type") {
                options.sql_type = Some(value.value());
            } else if meta.path.is_ident("references") {
                validate_table_name_syn(&value.value(), value.span())?;
                options.references = Some(value.value());
            } else if meta.path.is_ident("check") {
                options.check = Some(value.value());
            } else {
                return Err(meta.error("unknown column option"));
            }
            Ok(())
        })?;
    }

    Ok(options)
}
