//! Normalize command implementation

use crate::cli::NormalizeArgs;
use crate::normalize::normalize;

/// Handle `fiche normalize` command
pub fn handle_normalize(args: &NormalizeArgs) -> String {
    normalize(&args.address.join(" "))
}
