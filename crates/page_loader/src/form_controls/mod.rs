mod entries;
mod query;

pub use entries::{form_data_entries, submitter_entry};
pub use query::{append_query, encode_entry, encode_pair, serialize_for_get};

#[cfg(test)]
mod tests;
