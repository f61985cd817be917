//! WMI-backed source
//!
//! Connects to a namespace through COM and runs raw WQL. Only functional on
//! Windows; elsewhere `connect` reports [`QueryError::Unsupported`].

use super::QueryError;

const WBEM_E_ACCESS_DENIED: u32 = 0x8004_1003;
const WBEM_E_PROVIDER_FAILURE: u32 = 0x8004_1004;
const WBEM_E_INVALID_NAMESPACE: u32 = 0x8004_100E;
const WBEM_E_INVALID_CLASS: u32 = 0x8004_1010;
const WBEM_E_PROVIDER_NOT_FOUND: u32 = 0x8004_1011;
const WBEM_E_PROVIDER_LOAD_FAILURE: u32 = 0x8004_1013;
const WBEM_E_TRANSPORT_FAILURE: u32 = 0x8004_1015;
const E_ACCESSDENIED: u32 = 0x8007_0005;
const RPC_S_SERVER_UNAVAILABLE: u32 = 0x8007_06BA;
const RPC_E_DISCONNECTED: u32 = 0x8001_0108;

/// Map a failed HRESULT onto the error taxonomy
pub fn classify_hresult(hres: u32, context: &str) -> QueryError {
    let message = format!("{} (HRESULT {:#010X})", context, hres);
    match hres {
        WBEM_E_INVALID_NAMESPACE => QueryError::NamespaceNotFound(message),
        WBEM_E_ACCESS_DENIED | E_ACCESSDENIED => QueryError::PermissionDenied(message),
        WBEM_E_INVALID_CLASS
        | WBEM_E_PROVIDER_NOT_FOUND
        | WBEM_E_PROVIDER_LOAD_FAILURE
        | WBEM_E_PROVIDER_FAILURE
        | WBEM_E_TRANSPORT_FAILURE
        | RPC_E_DISCONNECTED
        | RPC_S_SERVER_UNAVAILABLE => QueryError::ServiceUnavailable(message),
        _ => QueryError::Query(message),
    }
}

#[cfg(windows)]
mod imp {
    use super::classify_hresult;
    use crate::source::{InstrumentationSource, Query, QueryError, Record};
    use std::collections::HashMap;
    use wmi::{COMLibrary, Variant, WMIConnection, WMIError};

    /// Connection to one WMI namespace, bound to the thread that opened it
    pub struct WmiSource {
        namespace: String,
        connection: WMIConnection,
    }

    impl WmiSource {
        pub fn connect(namespace: &str) -> Result<Self, QueryError> {
            let com = COMLibrary::new()
                .map_err(|e| wmi_error(e, "Failed to initialize COM"))?;
            let connection = WMIConnection::with_namespace_path(namespace, com)
                .map_err(|e| wmi_error(e, &format!("Failed to connect to {}", namespace)))?;
            tracing::debug!("Connected to WMI namespace {}", namespace);
            Ok(Self {
                namespace: namespace.to_string(),
                connection,
            })
        }

        pub fn namespace(&self) -> &str {
            &self.namespace
        }
    }

    impl InstrumentationSource for WmiSource {
        fn query(&self, query: &Query) -> Result<Vec<Record>, QueryError> {
            let wql = query.to_wql();
            tracing::debug!("{}: {}", self.namespace, wql);

            let rows: Vec<HashMap<String, Variant>> = self
                .connection
                .raw_query(&wql)
                .map_err(|e| wmi_error(e, &format!("{} failed in {}", wql, self.namespace)))?;

            Ok(rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|(k, v)| (k, variant_to_json(v)))
                        .collect()
                })
                .collect())
        }
    }

    fn wmi_error(error: WMIError, context: &str) -> QueryError {
        match error {
            WMIError::HResultError { hres } => classify_hresult(hres as u32, context),
            other => QueryError::Query(format!("{}: {}", context, other)),
        }
    }

    fn variant_to_json(variant: Variant) -> serde_json::Value {
        use serde_json::Value;

        match variant {
            Variant::Empty | Variant::Null => Value::Null,
            Variant::String(s) => Value::String(s),
            Variant::Bool(b) => Value::Bool(b),
            Variant::I1(n) => n.into(),
            Variant::I2(n) => n.into(),
            Variant::I4(n) => n.into(),
            Variant::I8(n) => n.into(),
            Variant::UI1(n) => n.into(),
            Variant::UI2(n) => n.into(),
            Variant::UI4(n) => n.into(),
            Variant::UI8(n) => n.into(),
            Variant::R4(f) => Value::from(f64::from(f)),
            Variant::R8(f) => Value::from(f),
            Variant::Array(items) => Value::Array(items.into_iter().map(variant_to_json).collect()),
            _ => Value::Null,
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use crate::source::{InstrumentationSource, Query, QueryError, Record};

    /// Placeholder so the crate builds off Windows; it can never connect
    #[derive(Debug)]
    pub struct WmiSource {
        namespace: String,
    }

    impl WmiSource {
        pub fn connect(namespace: &str) -> Result<Self, QueryError> {
            tracing::debug!("Refusing to connect to {} off Windows", namespace);
            Err(QueryError::Unsupported)
        }

        pub fn namespace(&self) -> &str {
            &self.namespace
        }
    }

    impl InstrumentationSource for WmiSource {
        fn query(&self, _query: &Query) -> Result<Vec<Record>, QueryError> {
            Err(QueryError::Unsupported)
        }
    }
}

pub use imp::WmiSource;
