use crate::api::ApiError;
use crate::models::Filter;

/// Newest issues first.
pub const SORT_PARAM: (&str, &str) = ("sort[0]", "createdAt:desc");

const STATUS_FILTER: &str = "filters[issueStatus][$eq]";
const USER_FILTER: &str = "filters[userId][$eq]";

/// Query parameters for `GET /issues` under `filter`.
///
/// `Filter::Mine` needs the signed-in user's id and fails without one rather
/// than silently listing everything.
pub fn list_params(filter: Filter, current_user_id: Option<&str>) -> Result<Vec<(String, String)>, ApiError> {
    let mut params = vec![(SORT_PARAM.0.to_string(), SORT_PARAM.1.to_string())];

    match filter {
        Filter::All => {}
        Filter::Status(status) => {
            params.push((STATUS_FILTER.to_string(), status.as_str().to_string()));
        }
        Filter::Mine => {
            let user_id = current_user_id
                .filter(|id| !id.is_empty())
                .ok_or(ApiError::Unauthenticated)?;
            params.push((USER_FILTER.to_string(), user_id.to_string()));
        }
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueStatus;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_all_only_sorts() {
        let params = list_params(Filter::All, Some("5")).unwrap();
        assert_eq!(params, vec![pair("sort[0]", "createdAt:desc")]);
    }

    #[test]
    fn test_open_filters_on_status() {
        let params = list_params(Filter::Status(IssueStatus::Open), None).unwrap();
        assert!(params.contains(&pair("sort[0]", "createdAt:desc")));
        assert!(params.contains(&pair("filters[issueStatus][$eq]", "Open")));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_in_progress_uses_wire_spelling() {
        let params = list_params(Filter::Status(IssueStatus::InProgress), None).unwrap();
        assert!(params.contains(&pair("filters[issueStatus][$eq]", "In-progress")));
    }

    #[test]
    fn test_mine_filters_on_user() {
        let params = list_params(Filter::Mine, Some("42")).unwrap();
        assert!(params.contains(&pair("filters[userId][$eq]", "42")));
    }

    #[test]
    fn test_mine_requires_user() {
        assert_eq!(list_params(Filter::Mine, None), Err(ApiError::Unauthenticated));
        assert_eq!(list_params(Filter::Mine, Some("")), Err(ApiError::Unauthenticated));
    }
}
