//! Constants for LeadFlow API
//!
//! Client-facing messages and defaults used across the API layer.

// ============================================================================
// CLIENT MESSAGES
// ============================================================================

/// Generic body for every 5xx response.
pub const MSG_INTERNAL_ERROR: &str = "Erro interno do servidor";

pub const MSG_SERVICE_UNAVAILABLE: &str = "Serviço temporariamente indisponível";

/// The web client shows this verbatim under the due date input.
pub const MSG_INVALID_DUE_DATE: &str =
    "Data de vencimento inválida. Por favor, insira uma data válida.";

pub const MSG_TASK_NOT_FOUND: &str = "Tarefa não encontrada";

pub const MSG_BUSINESS_RULE_REFERENCE: &str =
    "Operação não permitida: o registro possui vínculos ou referencia um registro inexistente";

pub const MSG_LEAD_HAS_DEPENDENTS: &str =
    "Não é possível excluir o lead pois ele possui tarefas, atividades ou logs vinculados";

pub const MSG_RESET_OK: &str = "Banco de dados resetado com sucesso!";

pub const MSG_RESET_DISABLED: &str = "Reset do banco de dados desabilitado neste ambiente";

// ============================================================================
// HEALTH
// ============================================================================

pub const HEALTH_STATUS_OK: &str = "OK";

// ============================================================================
// SERVER
// ============================================================================

/// Default HTTP port, overridable through `PORT`.
pub const DEFAULT_PORT: u16 = 5000;

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// PAGINATION
// ============================================================================

/// Default number of log entries returned by `GET /api/logs`
pub const DEFAULT_LOG_LIMIT: i64 = 100;

/// Maximum number of log entries a single request may ask for
pub const MAX_LOG_LIMIT: i64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_limits_are_consistent() {
        assert!(DEFAULT_LOG_LIMIT > 0);
        assert!(DEFAULT_LOG_LIMIT <= MAX_LOG_LIMIT);
    }

    #[test]
    fn test_dependents_messages_use_possui() {
        assert!(MSG_LEAD_HAS_DEPENDENTS.contains("possui"));
        assert!(MSG_BUSINESS_RULE_REFERENCE.contains("possui"));
    }
}
