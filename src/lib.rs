//! Company Leads API Library
//!
//! This library provides the lead service: the Lead state machine, its storage
//! (PostgreSQL or in-memory), acceptance notifications, and the HTTP API.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `domain`: Core business logic.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `db`: Database connection and migrations.
//! - `db_storage`: PostgreSQL lead repository.
//! - `errors`: Error handling types.
//! - `extract`: Request extractors with JSON rejections.
//! - `handlers`: HTTP request handlers.
//! - `lead`: Lead entity and status state machine.
//! - `mail`: Notification contract and local mail sender.
//! - `mail_client`: HTTP mail relay client.
//! - `models`: Wire and database models.
//! - `money`: Currency amounts.
//! - `openapi`: OpenAPI document and Swagger UI.
//! - `repository`: Lead storage contract and in-memory store.
//! - `router`: Route table and middleware.
//! - `validation`: Input bounds.

pub mod api;
pub mod domain;
pub mod integrations;

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod lead;
pub mod mail;
pub mod mail_client;
pub mod models;
pub mod money;
pub mod openapi;
pub mod repository;
pub mod router;
pub mod validation;
