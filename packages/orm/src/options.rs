/// Behavioral switches fixed when the connection is opened.
///
/// The defaults are the safe ones: mass writes without a condition are
/// refused, writes run in their own transaction, and migrations create
/// foreign key constraints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrmOptions {
    pub allow_global_update: bool,
    pub skip_default_transaction: bool,
    pub disable_foreign_key_constraint_when_migrating: bool,
}
