use proc_macro::TokenStream;

mod row;

/// Derive macro for the `Row` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Row)]
/// #[row(table = "Users")]
/// struct User {
///     pub id: Option<i64>,
///     pub name: String,
/// }
/// ```
///
/// - `#[row(table = "...")]` sets the table name.
///   If omitted, defaults to snake_case struct name + "s".
///
/// Only structs with named fields can derive `Row`, since rows travel
/// through the store as field maps.
#[proc_macro_derive(Row, attributes(row))]
pub fn derive_row(input: TokenStream) -> TokenStream {
    row::derive_row(input)
}
