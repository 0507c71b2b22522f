pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod omdb;
pub mod repository;
pub mod usecase;
pub mod viewmodel;
