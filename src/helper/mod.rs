pub mod feature_helper;
