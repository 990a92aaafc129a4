/// Strips every non-digit character from an ISBN, producing the key used to
/// look up cover images.
///
/// ISBN-10 check digits of `X` are dropped along with hyphens and spaces.
pub fn clean_isbn(isbn: &str) -> String {
    isbn.chars().filter(|c| c.is_ascii_digit()).collect()
}
