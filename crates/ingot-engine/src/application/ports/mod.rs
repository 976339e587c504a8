//! Application Ports (Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! The engine drives brokers through [`BrokerGateway`]; adapters in
//! the infrastructure layer implement it.

mod broker_gateway;

pub use broker_gateway::{
    BrokerFill, BrokerGateway, GatewayError, MarketOrderRequest, Quote, SymbolInfo,
};
