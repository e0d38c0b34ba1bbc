// Output rendering for cluster lists.
//
// The engine itself exposes no I/O surface; this module is the terminal
// rendering the CLI driver delegates to. JSON output goes straight through
// serde in the driver.

pub mod terminal;
