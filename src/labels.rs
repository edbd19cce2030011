use crate::models::EntityKind;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

type LabelMap = BTreeMap<(EntityKind, &'static str), &'static str>;

// The upstream dashboard keyed its record fields by human-readable,
// accented Portuguese column headers. Internally everything uses the
// normalized field names; this table exists for presentation only.
static DISPLAY_LABELS: Lazy<LabelMap> = Lazy::new(|| {
    let mut labels = BTreeMap::new();
    let entries: [(EntityKind, &str, &str); 34] = [
        (EntityKind::Client, "name", "Nome"),
        (EntityKind::Client, "company", "Empresa"),
        (EntityKind::Client, "email", "E-mail"),
        (EntityKind::Client, "phone", "Telefone"),
        (EntityKind::Client, "status", "Status"),
        (EntityKind::Client, "monthlyFeeCents", "Mensalidade"),
        (EntityKind::ChannelItem, "channel", "Canal"),
        (EntityKind::ChannelItem, "objective", "Objetivo"),
        (EntityKind::ChannelItem, "format", "Formato"),
        (EntityKind::ChannelItem, "frequency", "Frequência"),
        (EntityKind::ChannelItem, "responsible", "Responsável"),
        (EntityKind::StrategyMatrixItem, "contentType", "Tipo de Conteúdo"),
        (EntityKind::StrategyMatrixItem, "funnelStage", "Etapa do Funil"),
        (EntityKind::StrategyMatrixItem, "objective", "Objetivo"),
        (EntityKind::StrategyMatrixItem, "example", "Exemplo"),
        (EntityKind::RdcIdea, "title", "Ideia"),
        (EntityKind::RdcIdea, "resolution", "Resolução"),
        (EntityKind::RdcIdea, "demand", "Demanda"),
        (EntityKind::RdcIdea, "competition", "Concorrência"),
        (EntityKind::RdcIdea, "score", "Pontuação"),
        (EntityKind::RdcIdea, "decision", "Decisão"),
        (EntityKind::PlanningItem, "title", "Título"),
        (EntityKind::PlanningItem, "channel", "Canal"),
        (EntityKind::PlanningItem, "publishDate", "Data de Publicação"),
        (EntityKind::PlanningItem, "responsible", "Responsável"),
        (EntityKind::FinanceEntry, "description", "Descrição"),
        (EntityKind::FinanceEntry, "amountCents", "Valor"),
        (EntityKind::FinanceEntry, "category", "Categoria"),
        (EntityKind::FinanceEntry, "entryDate", "Data"),
        (EntityKind::Task, "title", "Tarefa"),
        (EntityKind::Task, "dueDate", "Prazo"),
        (EntityKind::Task, "assignee", "Responsável"),
        (EntityKind::Collaborator, "name", "Nome"),
        (EntityKind::Collaborator, "hourlyRateCents", "Valor Hora"),
    ];
    for (kind, field, label) in entries {
        labels.insert((kind, field), label);
    }
    labels
});

/// Presentation label for a normalized field name; falls back to the field
/// name itself for anything without a translation.
pub fn display_label(kind: EntityKind, field: &'static str) -> &'static str {
    DISPLAY_LABELS.get(&(kind, field)).copied().unwrap_or(field)
}

/// Reverse lookup used when importing rows keyed by display labels.
pub fn field_for_label(kind: EntityKind, label: &str) -> Option<&'static str> {
    DISPLAY_LABELS
        .iter()
        .find_map(|(&(entry_kind, field), &entry_label)| {
            (entry_kind == kind && entry_label == label).then_some(field)
        })
}
