use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Path of the analysis endpoint, relative to the configured server.
pub const UPLOAD_PATH: &str = "/api/upload-csv";

/// Name of the single multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "csv_file";

pub const NO_FILE_SELECTED: &str = "Por favor, selecciona un archivo CSV.";
pub const GENERIC_UPLOAD_ERROR: &str = "Ocurrió un error al subir el archivo.";
pub const MISSING_CHARTS: &str = "El servidor no devolvió la lista de gráficos.";
pub const SERVER_UNREACHABLE: &str =
    "No se pudo conectar con el servidor backend. Asegúrate de que está corriendo.";

pub const COVERAGE_FALLBACK: &str =
    "No se encontró información geográfica disponible para determinar una cobertura específica.";
pub const ANALYSIS_TYPES_FALLBACK: &str =
    "No se pudo generar un análisis de los tipos de análisis disponibles.";
pub const SOURCE_DEFAULT: &str =
    "Información de la fuente se generará automáticamente o se actualizará aquí.";
pub const RELEVANCE_STATEMENT: &str = "Estas visualizaciones son cruciales para entender \
rápidamente patrones en los datos, identificar anomalías y comunicar hallazgos complejos de \
manera efectiva, facilitando la toma de decisiones informadas en áreas como la política \
pública o la estrategia empresarial.";

/// Raw body returned by the analysis service.
///
/// The chart list is required on success and arrives as strings that each
/// hold a second, independently encoded JSON document. It stays optional here
/// so failure bodies, which carry only `error`, still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plotly_figures_json: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_coverage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_code: Option<String>,
}

/// One chart as understood by the charting capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescription {
    pub data: Vec<Value>,
    pub layout: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<Value>>,
}

/// Display fields derived from a response, with fixed defaults for the ones the
/// service never sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedInfo {
    pub source: String,
    pub structure: String,
    pub period: String,
    pub coverage: String,
    pub analysis_types: String,
    pub relevance: String,
}

impl Default for ProjectedInfo {
    fn default() -> Self {
        Self {
            source: SOURCE_DEFAULT.to_string(),
            structure: String::new(),
            period: String::new(),
            coverage: String::new(),
            analysis_types: String::new(),
            relevance: String::new(),
        }
    }
}

/// Charts and text produced by one successful attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub charts: Vec<ChartDescription>,
    pub info: ProjectedInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Service,
    MalformedPayload,
}

impl FailureKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transport => "Transport",
            Self::Service => "Service",
            Self::MalformedPayload => "Malformed payload",
        }
    }
}

/// The user-visible failure of one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl AttemptFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
