//! Space discovery: the paginated catalog and a single space's detail.

use super::non_blank;
use crate::environment::SpacerEnvironment;
use serde::Deserialize;
use spacer_api::ApiError;
use spacer_api::models::{SpaceDetail, SpaceId, SpacePage, SpaceQuery, SpaceType, Space};
use spacer_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Shown when the catalog cannot be fetched
pub const LOAD_FAILED: &str = "Failed to load spaces. Please try again later.";

/// Catalog query string as typed into the filter form.
///
/// Every field is text so that empty inputs and stray values never reject
/// the request; unusable values are dropped.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// 1-based page
    #[serde(default)]
    pub page: Option<String>,
    /// Address substring
    #[serde(default)]
    pub location: Option<String>,
    /// Space type wire name
    #[serde(default, rename = "type")]
    pub space_type: Option<String>,
    /// Minimum capacity
    #[serde(default)]
    pub min_capacity: Option<String>,
    /// Maximum hourly rate
    #[serde(default)]
    pub max_hourly_rate: Option<String>,
    /// Name search, applied to the fetched page
    #[serde(default)]
    pub q: Option<String>,
}

/// Parsed catalog filters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogFilters {
    /// 1-based page
    pub page: u32,
    /// Address substring
    pub location: Option<String>,
    /// Exact type
    pub space_type: Option<SpaceType>,
    /// Minimum capacity
    pub min_capacity: Option<u32>,
    /// Maximum hourly rate
    pub max_hourly_rate: Option<f64>,
    /// Case-insensitive name search
    pub search: Option<String>,
}

impl From<CatalogQuery> for CatalogFilters {
    fn from(query: CatalogQuery) -> Self {
        let text = |value: Option<String>| value.as_deref().and_then(non_blank);
        Self {
            page: text(query.page)
                .and_then(|p| p.parse().ok())
                .filter(|p| *p > 0)
                .unwrap_or(1),
            location: text(query.location),
            space_type: text(query.space_type).map(SpaceType::from),
            min_capacity: text(query.min_capacity).and_then(|c| c.parse().ok()),
            max_hourly_rate: text(query.max_hourly_rate)
                .and_then(|r| r.parse::<f64>().ok())
                .filter(|r| r.is_finite() && *r >= 0.0),
            search: text(query.q),
        }
    }
}

impl CatalogFilters {
    /// API query for these filters
    #[must_use]
    pub fn to_query(&self, per_page: u32) -> SpaceQuery {
        SpaceQuery {
            page: Some(self.page.max(1)),
            per_page: Some(per_page),
            location: self.location.clone(),
            space_type: self.space_type.clone(),
            min_capacity: self.min_capacity,
            max_hourly_rate: self.max_hourly_rate,
        }
    }

    /// Whether a space passes the name search
    #[must_use]
    pub fn matches_search(&self, space: &Space) -> bool {
        self.search
            .as_ref()
            .is_none_or(|needle| space.name.to_lowercase().contains(&needle.to_lowercase()))
    }
}

/// Catalog page state.
#[derive(Clone, Debug, Default)]
pub struct CatalogState {
    /// Active filters
    pub filters: CatalogFilters,
    /// Spaces on the current page that pass the name search
    pub spaces: Vec<Space>,
    /// Total matching spaces (server side filters only)
    pub total: u32,
    /// Number of pages
    pub pages: u32,
    /// Page shown
    pub current_page: u32,
    /// A fetch is in flight
    pub loading: bool,
    /// Inline error alert
    pub alert: Option<String>,
}

impl CatalogState {
    /// Whether a "Previous" link applies
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Whether a "Next" link applies
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.pages
    }
}

/// Catalog actions.
#[derive(Clone, Debug)]
pub enum CatalogAction {
    /// Fetch the page described by the filters
    Load(CatalogFilters),
    /// `GET /spaces` succeeded
    Loaded(SpacePage),
    /// `GET /spaces` failed
    LoadFailed(ApiError),
}

/// Reducer for the catalog page
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = SpacerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::Load(filters) => {
                let query = filters.to_query(env.settings.page_size);
                state.filters = filters;
                state.loading = true;
                state.alert = None;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    Some(match api.list_spaces(&query).await {
                        Ok(page) => CatalogAction::Loaded(page),
                        Err(error) => CatalogAction::LoadFailed(error),
                    })
                })]
            },

            CatalogAction::Loaded(page) => {
                state.loading = false;
                state.total = page.total;
                state.pages = page.pages;
                state.current_page = page.current_page;
                state.spaces = page
                    .spaces
                    .into_iter()
                    .filter(|space| state.filters.matches_search(space))
                    .collect();
                SmallVec::new()
            },

            CatalogAction::LoadFailed(error) => {
                state.loading = false;
                tracing::warn!(%error, "Failed to load catalog");
                state.alert = Some(LOAD_FAILED.to_string());
                SmallVec::new()
            },
        }
    }
}

/// Space detail page state.
#[derive(Clone, Debug, Default)]
pub struct SpaceDetailState {
    /// The space and its reviews, once loaded
    pub detail: Option<SpaceDetail>,
    /// Failure, if the fetch failed
    pub error: Option<ApiError>,
}

/// Space detail actions.
#[derive(Clone, Debug)]
pub enum SpaceDetailAction {
    /// Fetch a space
    Load(SpaceId),
    /// `GET /spaces/{id}` succeeded
    Loaded(Box<SpaceDetail>),
    /// `GET /spaces/{id}` failed
    LoadFailed(ApiError),
}

/// Reducer for the space detail page
#[derive(Clone, Debug, Default)]
pub struct SpaceDetailReducer;

impl Reducer for SpaceDetailReducer {
    type State = SpaceDetailState;
    type Action = SpaceDetailAction;
    type Environment = SpacerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SpaceDetailAction::Load(space_id) => {
                state.error = None;
                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    Some(match api.get_space(&space_id).await {
                        Ok(detail) => SpaceDetailAction::Loaded(Box::new(detail)),
                        Err(error) => SpaceDetailAction::LoadFailed(error),
                    })
                })]
            },

            SpaceDetailAction::Loaded(detail) => {
                state.detail = Some(*detail);
                SmallVec::new()
            },

            SpaceDetailAction::LoadFailed(error) => {
                tracing::warn!(%error, "Failed to load space");
                state.error = Some(error);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::test_support::{WAIT, api_env};
    use spacer_runtime::Store;
    use spacer_testing::{MockSpacerApi, ReducerTest, assertions, fixtures};

    fn spaces(count: usize) -> Vec<Space> {
        (1..=count)
            .map(|i| fixtures::space(&format!("s-{i}"), &format!("Garden {i}")))
            .collect()
    }

    #[test]
    fn test_query_parsing_drops_unusable_values() {
        let filters = CatalogFilters::from(CatalogQuery {
            page: Some("0".to_string()),
            location: Some("  ".to_string()),
            space_type: Some("library".to_string()),
            min_capacity: Some("ten".to_string()),
            max_hourly_rate: Some("25.5".to_string()),
            q: Some(" rose ".to_string()),
        });

        assert_eq!(filters.page, 1);
        assert_eq!(filters.location, None);
        assert_eq!(filters.space_type, Some(SpaceType::Library));
        assert_eq!(filters.min_capacity, None);
        assert_eq!(filters.max_hourly_rate, Some(25.5));
        assert_eq!(filters.search.as_deref(), Some("rose"));
    }

    #[test]
    fn test_load_uses_configured_page_size() {
        let filters = CatalogFilters {
            page: 3,
            ..CatalogFilters::default()
        };
        assert_eq!(filters.to_query(6).per_page, Some(6));
        assert_eq!(filters.to_query(6).page, Some(3));

        ReducerTest::new(CatalogReducer)
            .with_env(api_env(&MockSpacerApi::new()))
            .given_state(CatalogState::default())
            .when_action(CatalogAction::Load(filters))
            .then_state(|state| {
                assert!(state.loading);
                assert_eq!(state.filters.page, 3);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn test_catalog_paginates() {
        let api = MockSpacerApi::new().with_spaces(spaces(8));
        let store = Store::new(CatalogState::default(), CatalogReducer, api_env(&api));

        store
            .send_and_wait(
                CatalogAction::Load(CatalogFilters {
                    page: 2,
                    ..CatalogFilters::default()
                }),
                WAIT,
            )
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.total, 8);
        assert_eq!(state.pages, 2);
        assert_eq!(state.spaces.len(), 2);
        assert!(state.has_previous());
        assert!(!state.has_next());
    }

    #[tokio::test]
    async fn test_name_search_filters_fetched_page() {
        let mut all = spaces(3);
        all[1].name = "Rose Terrace".to_string();
        let api = MockSpacerApi::new().with_spaces(all);
        let store = Store::new(CatalogState::default(), CatalogReducer, api_env(&api));

        store
            .send_and_wait(
                CatalogAction::Load(CatalogFilters {
                    page: 1,
                    search: Some("ROSE".to_string()),
                    ..CatalogFilters::default()
                }),
                WAIT,
            )
            .await
            .unwrap();

        let names = store
            .state(|s| s.spaces.iter().map(|sp| sp.name.clone()).collect::<Vec<_>>())
            .await;
        assert_eq!(names, vec!["Rose Terrace"]);
    }

    #[tokio::test]
    async fn test_catalog_failure_alert() {
        let api = MockSpacerApi::new()
            .failing("list_spaces", ApiError::RequestFailed("refused".to_string()));
        let store = Store::new(CatalogState::default(), CatalogReducer, api_env(&api));

        store
            .send_and_wait(CatalogAction::Load(CatalogFilters::default()), WAIT)
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.alert.as_deref(), Some(LOAD_FAILED));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_space_detail_loads_reviews() {
        let api = MockSpacerApi::new()
            .with_spaces(spaces(1))
            .with_reviews("s-1", Vec::new());
        let store = Store::new(SpaceDetailState::default(), SpaceDetailReducer, api_env(&api));

        store
            .send_and_wait(SpaceDetailAction::Load(SpaceId::new("s-1")), WAIT)
            .await
            .unwrap();
        assert_eq!(
            store
                .state(|s| s.detail.as_ref().map(|d| d.space.name.clone()))
                .await
                .as_deref(),
            Some("Garden 1")
        );

        store
            .send_and_wait(SpaceDetailAction::Load(SpaceId::new("missing")), WAIT)
            .await
            .unwrap();
        let error = store.state(|s| s.error.clone()).await.unwrap();
        assert_eq!(error.status(), Some(404));
    }
}
