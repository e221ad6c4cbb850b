use validator::Validate;

/// Query string shared by both report endpoints, e.g.
/// `?id=182&id=190&fecha_inicio=2024-01-01&fecha_fin=2024-01-31&page=1&page_size=500`.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub(crate) struct ReportQuery {
    #[validate(length(min = 1, message = "At least one id is required"))]
    pub(crate) ids: Vec<i64>,
    pub(crate) fecha_inicio: Option<String>,
    pub(crate) fecha_fin: Option<String>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub(crate) page: u32,
    #[validate(range(min = 1, message = "page_size must be at least 1"))]
    pub(crate) page_size: Option<u32>,
}

impl ReportQuery {
    /// Builds the query from raw `(key, value)` pairs, keeping every repeated
    /// `id`. Unknown keys are ignored; blank date bounds count as absent.
    pub(crate) fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, String> {
        let mut query = Self {
            ids: Vec::new(),
            fecha_inicio: None,
            fecha_fin: None,
            page: 1,
            page_size: None,
        };

        for (key, value) in pairs {
            let value = value.trim();
            match key.as_str() {
                "id" => query.ids.push(parse_number("id", value)?),
                "page" => query.page = parse_number("page", value)?,
                "page_size" => query.page_size = Some(parse_number("page_size", value)?),
                "fecha_inicio" => query.fecha_inicio = non_blank(value),
                "fecha_fin" => query.fecha_fin = non_blank(value),
                _ => {}
            }
        }

        Ok(query)
    }

    /// Both bounds, only when both were supplied.
    pub(crate) fn date_bounds(&self) -> Option<(&str, &str)> {
        match (&self.fecha_inicio, &self.fecha_fin) {
            (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
            _ => None,
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, String> {
    value.parse::<T>().map_err(|_| format!("{field} must be an integer, got '{value}'"))
}

fn non_blank(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
