pub mod a001_seller_account;
