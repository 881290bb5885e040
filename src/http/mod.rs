/// HTTP transport layer
///
/// A small one-shot HTTP client that normalizes how requests are built
/// (method, headers, body encoding, query strings) independently of the
/// service being called.
///
/// 1. **URL resolution** - [`parse_url`] splits a URL into default-filled components
/// 2. **Query encoding** - [`build_query`] encodes parameter maps with bare repeated keys
/// 3. **Request building** - [`configure_request`] picks the body encoding and content type
/// 4. **Transport** - [`Transport`] performs a single exchange through a [`Connector`]
pub mod connector;
pub mod error;
pub mod mock;
pub mod query;
pub mod request;
pub mod transport;
pub mod url;

pub use connector::{Connection, Connector, HttpResponse, ReqwestConnector};
pub use error::TransportError;
pub use mock::{MockConnector, MockReply, RecordedRequest};
pub use query::{ParamValue, Params, Payload, build_query, encode_form};
pub use request::{
    FORM_CONTENT_TYPE, JSON_CONTENT_TYPE, PreparedRequest, RequestOptions, TransportSettings,
    configure_request, is_body_bearing,
};
pub use transport::{Diagnostics, Transport};
pub use self::url::{UrlComponents, parse_url};
