//! Orebi prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartValidationError, ValidatedCart},
    customer::{Address, CustomerInfo, SessionUser, UserProfile},
    document::{
        DecodeError, Document, EncodeError, Value, from_document, sanitize_document, to_document,
    },
    items::{LineItem, NormalizedLineItem, NumericInput, normalize, normalize_all},
    orders::{
        HistoryAction, Order, OrderFilter, OrderHistoryEntry, OrderId, OrderSettings, OrderStats,
        PaymentStatus, StatusChange, assemble,
    },
    pricing::PriceBreakdown,
    receipt::{Receipt, ReceiptError},
    tracking::{
        OrderStatus, Stage, StageRecord, StageStatus, StatusUpdate, TrackingStages,
        TransitionError,
    },
};
