mod recording;
#[cfg(feature = "sqlite-native")]
mod test_api;

#[cfg(feature = "sqlite-native")]
mod catalog;
#[cfg(feature = "sqlite-native")]
mod rids;
#[cfg(feature = "sqlite-native")]
mod structure;
