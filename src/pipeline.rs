//! One address query, end to end.
//!
//! Geocode, fetch diagnostics and transactions, narrow each set with its
//! chooser, reconcile the survivors and audit which columns were used.
//! Every step after geocoding degrades to a [`QueryWarning`] instead of
//! failing the query.

use crate::audit::{audit, UsageMap};
use crate::clients::{
    AdemeDiagnostics, BanGeocoder, ClientError, CsvTransactionTable, DiagnosticFetch,
    DiagnosticSource, GeoLocation, GeoLookup, GeoplateformeParcels, ParcelLookup,
    TransactionSource,
};
use crate::config::{DiagnosticQuery, FicheConfig};
use crate::logging::generate_query_id;
use crate::normalize::normalize;
use crate::reconcile::{diagnostic_field_list, reconcile, ReconciledRecord};
use crate::record::{CandidateSet, Source};
use crate::reduce::{reduce, Chooser};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// Field lists and dimensions used by a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub diagnostic_query: DiagnosticQuery,
    pub diagnostic_dimensions: Vec<String>,
    pub diagnostic_fields: Vec<String>,
    pub include_all_columns: bool,
    pub transaction_dimensions: Vec<String>,
    pub transaction_fields: Vec<String>,
}

impl PipelineSettings {
    pub fn from_config(config: &FicheConfig) -> Self {
        Self {
            diagnostic_query: config.diagnostics.query,
            diagnostic_dimensions: config.diagnostics.dimensions.clone(),
            diagnostic_fields: config.diagnostics.fields.clone(),
            include_all_columns: config.diagnostics.include_all_columns,
            transaction_dimensions: config.transactions.dimensions.clone(),
            transaction_fields: config.transactions.fields.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&FicheConfig::default())
    }
}

/// Non-fatal conditions met while answering a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum QueryWarning {
    NoDiagnosticOnFile,
    DiagnosticFetchFailed(String),
    NoTransactionFound,
    ParcelLookupFailed(String),
}

impl fmt::Display for QueryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryWarning::NoDiagnosticOnFile => {
                write!(f, "No energy diagnostic on file for this address")
            }
            QueryWarning::DiagnosticFetchFailed(msg) => {
                write!(f, "Energy diagnostics unavailable: {}", msg)
            }
            QueryWarning::NoTransactionFound => {
                write!(f, "No recorded sale found for this address")
            }
            QueryWarning::ParcelLookupFailed(msg) => {
                write!(f, "Cadastral parcel lookup failed: {}", msg)
            }
        }
    }
}

/// Everything known about one address after reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub query_id: String,
    pub input: String,
    /// Normalized geocoder label, the key of the transaction table
    pub normalized_address: String,
    pub location: GeoLocation,
    pub parcels: Vec<String>,
    /// Transaction rows left after reduction
    pub transactions: CandidateSet,
    /// Diagnostic rows left after reduction
    pub diagnostics: CandidateSet,
    pub record: ReconciledRecord,
    pub transaction_usage: UsageMap,
    pub diagnostic_usage: UsageMap,
    pub warnings: Vec<QueryWarning>,
}

impl Report {
    /// Settle a multi-valued field and refresh the usage maps.
    pub fn select(&mut self, name: &str, source: Source, index: usize) -> bool {
        if !self.record.select(name, source, index) {
            return false;
        }
        self.transaction_usage = audit(&self.record, &self.transactions, Source::Dvf);
        self.diagnostic_usage = audit(&self.record, &self.diagnostics, Source::Dpe);
        true
    }
}

#[derive(Debug)]
pub enum QueryOutcome {
    /// The address was blank once normalized; nothing was attempted.
    NoInput,
    /// Geocoding failed; no dataset was queried.
    LookupFailed(ClientError),
    Completed(Box<Report>),
}

/// Runs address queries against a fixed set of sources.
pub struct QueryPipeline {
    geocoder: Arc<dyn GeoLookup>,
    parcels: Option<Arc<dyn ParcelLookup>>,
    diagnostics: Arc<dyn DiagnosticSource>,
    transactions: Arc<dyn TransactionSource>,
    settings: PipelineSettings,
}

impl QueryPipeline {
    pub fn new(
        geocoder: Arc<dyn GeoLookup>,
        diagnostics: Arc<dyn DiagnosticSource>,
        transactions: Arc<dyn TransactionSource>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            geocoder,
            parcels: None,
            diagnostics,
            transactions,
            settings,
        }
    }

    pub fn with_parcels(mut self, parcels: Arc<dyn ParcelLookup>) -> Self {
        self.parcels = Some(parcels);
        self
    }

    /// Wire the HTTP clients and the loaded transaction table from `config`.
    pub fn from_config(
        config: &FicheConfig,
        token: String,
        table: CsvTransactionTable,
    ) -> Result<Self, ClientError> {
        let client = crate::clients::build_http_client()?;

        let pipeline = Self::new(
            Arc::new(BanGeocoder::new(&config.geocoder, client.clone())),
            Arc::new(AdemeDiagnostics::new(
                &config.diagnostics,
                token,
                client.clone(),
            )),
            Arc::new(table),
            PipelineSettings::from_config(config),
        );

        Ok(if config.parcels.enabled {
            pipeline.with_parcels(Arc::new(GeoplateformeParcels::new(&config.parcels, client)))
        } else {
            pipeline
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Answer one address query.
    ///
    /// `dpe_chooser` and `dvf_chooser` are asked whenever a disambiguation
    /// dimension has several values in their set.
    pub async fn run<D, T>(
        &self,
        address: &str,
        dpe_chooser: &mut D,
        dvf_chooser: &mut T,
    ) -> QueryOutcome
    where
        D: Chooser + ?Sized,
        T: Chooser + ?Sized,
    {
        if normalize(address).is_empty() {
            return QueryOutcome::NoInput;
        }

        let query_id = generate_query_id();
        let span = tracing::info_span!("query", query_id = %query_id);
        self.run_query(query_id, address.trim(), dpe_chooser, dvf_chooser)
            .instrument(span)
            .await
    }

    async fn run_query<D, T>(
        &self,
        query_id: String,
        address: &str,
        dpe_chooser: &mut D,
        dvf_chooser: &mut T,
    ) -> QueryOutcome
    where
        D: Chooser + ?Sized,
        T: Chooser + ?Sized,
    {
        tracing::info!(address, "Query started");

        let location = match self.geocoder.lookup(address).await {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(error = %e, "Geocoding failed");
                return QueryOutcome::LookupFailed(e);
            }
        };
        let normalized_address = normalize(&location.label);
        let mut warnings = Vec::new();

        let fetch = match self.settings.diagnostic_query {
            DiagnosticQuery::Coordinates => {
                self.diagnostics
                    .by_coordinates(location.x, location.y)
                    .await
            }
            DiagnosticQuery::Address => self.diagnostics.by_address(&normalized_address).await,
        };
        let diagnostics = match fetch {
            DiagnosticFetch::Found(set) => set,
            DiagnosticFetch::NoneOnFile => {
                warnings.push(QueryWarning::NoDiagnosticOnFile);
                CandidateSet::new(Source::Dpe)
            }
            DiagnosticFetch::Failed(e) => {
                warnings.push(QueryWarning::DiagnosticFetchFailed(e.to_string()));
                CandidateSet::new(Source::Dpe)
            }
        };

        let transactions = self.transactions.by_address(&normalized_address);
        if transactions.is_empty() {
            warnings.push(QueryWarning::NoTransactionFound);
        }

        let mut parcels = Vec::new();
        if let Some(lookup) = &self.parcels {
            match lookup.parcels_at(location.longitude, location.latitude).await {
                Ok(ids) => parcels = ids,
                Err(e) => warnings.push(QueryWarning::ParcelLookupFailed(e.to_string())),
            }
        }

        tracing::debug!(
            diagnostics = diagnostics.len(),
            transactions = transactions.len(),
            parcels = parcels.len(),
            "Candidates fetched"
        );

        let diagnostics = reduce(diagnostics, &self.settings.diagnostic_dimensions, dpe_chooser);
        let transactions = reduce(
            transactions,
            &self.settings.transaction_dimensions,
            dvf_chooser,
        );

        let diagnostic_fields = diagnostic_field_list(
            &self.settings.diagnostic_fields,
            self.settings.include_all_columns,
            &diagnostics,
        );
        let record = reconcile(
            &transactions,
            &diagnostics,
            &self.settings.transaction_fields,
            &diagnostic_fields,
        );
        let transaction_usage = audit(&record, &transactions, Source::Dvf);
        let diagnostic_usage = audit(&record, &diagnostics, Source::Dpe);

        tracing::info!(
            fields = record.len(),
            ambiguous = record.ambiguous().count(),
            warnings = warnings.len(),
            "Query completed"
        );

        QueryOutcome::Completed(Box::new(Report {
            query_id,
            input: address.to_string(),
            normalized_address,
            location,
            parcels,
            transactions,
            diagnostics,
            record,
            transaction_usage,
            diagnostic_usage,
            warnings,
        }))
    }
}
