//! Holds Bitcoin-family script, input, output and transaction types, and the unspent output
//! record.

pub mod legacy;
pub mod script;
pub mod tx;
pub mod txin;
pub mod txout;
pub mod utxo;
pub mod witness;

pub use legacy::*;
pub use script::*;
pub use tx::*;
pub use txin::*;
pub use txout::*;
pub use utxo::*;
pub use witness::*;
