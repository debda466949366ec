pub mod db;
pub mod minio;
