// ABOUTME: Configuration management for the Tapcat server
// ABOUTME: Environment-driven server, database, and auth settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

/// Environment-based server configuration
pub mod environment;
