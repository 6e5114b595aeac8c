//! CLI Exit Code Registry
//!
//! Single source of truth for `billmerge` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, bad cell reference, no input) |
//! | 3    | I/O error (unreadable file, summary not written)     |
//! | 4    | Preset not found                                     |
//! | 5    | Preset invalid or preset file malformed              |
//! | 6    | Partial merge under `--strict`                       |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing inputs, malformed cell reference.
pub const EXIT_USAGE: u8 = 2;

/// I/O error - a file could not be read, or the summary could not be written.
pub const EXIT_IO: u8 = 3;

/// The named preset does not exist in the preset file.
pub const EXIT_PRESET_NOT_FOUND: u8 = 4;

/// The preset fails validation, or the preset file cannot be parsed.
pub const EXIT_PRESET_INVALID: u8 = 5;

/// `merge --strict`: the summary was written but some inputs were skipped.
pub const EXIT_PARTIAL: u8 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_PRESET_NOT_FOUND,
            EXIT_PRESET_INVALID,
            EXIT_PARTIAL,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
