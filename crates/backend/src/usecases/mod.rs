pub mod u508_unarchive_ozon_products;
