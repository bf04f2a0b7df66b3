/// Fatal error conditions the core can raise.
///
/// `UnknownOrigin` deliberately has no variant here: an unregistered origin
/// code passed to `rank` is a documented non-error (it is dropped from the
/// origins vector but still counted in the shoulder-day loop's `N`), not a
/// failure.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    #[error("stops {0} out of range [0, 2]")]
    InvalidStops(u8),
    #[error("date index out of range for the configured horizon")]
    DateOutOfRange,
}
