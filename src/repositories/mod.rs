pub(crate) mod items;
