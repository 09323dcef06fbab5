pub(crate) mod cloudinary;
pub(crate) mod item_store;
pub(crate) mod media;
pub(crate) mod storage;
