pub mod cat_file;
pub mod cat_index;
pub mod hash_object;
pub mod ls_tree;
pub mod rev_parse;
