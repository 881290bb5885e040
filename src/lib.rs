//! Uniform client for machine translation services.
//!
//! [`http`] is a one-shot HTTP transport that normalizes request building
//! across providers; [`mt`] holds the provider facades and the decoders that
//! map each provider's JSON onto one [`CanonicalResult`].

pub mod http;
pub mod mt;

pub use http::{Params, Payload, RequestOptions, Transport, TransportError};
pub use mt::{
    CanonicalResult, GoogleTranslateProvider, GoogleWebProvider, MicrosoftTranslatorProvider,
    MtError, MtResult, Translator,
};
