//! C preprocessor identifier derivation
//!
//! Every identifier that ends up in the generated header (element index
//! macros, group macros, vendor model macros) goes through [`to_c_macro`].
//! Hand-written firmware code references these names directly, so the
//! mapping must stay stable.

/// Convert arbitrary text into an upper-case macro-style identifier
///
/// Characters other than letters, digits and `_` become `_`. When the input
/// starts with a digit an underscore is appended (not prepended), so
/// `"3abc"` becomes `"3ABC_"`. Digits are matched across Unicode, so
/// `"²abc"` becomes `"²ABC_"` too.
pub fn to_c_macro(name: &str) -> String {
    let mut macro_name: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if name.chars().next().is_some_and(char::is_numeric) {
        macro_name.push('_');
    }

    macro_name.to_uppercase()
}
