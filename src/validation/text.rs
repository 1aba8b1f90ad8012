/// Rejects strings made only of whitespace.
///
/// # Arguments
///
/// * `value` - The text to check.
///
/// # Returns
///
/// A `garde::Result` that fails when nothing but whitespace was submitted.
pub fn not_blank<T: AsRef<str> + ?Sized>(value: &T, _context: &()) -> garde::Result {
    if value.as_ref().trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}
