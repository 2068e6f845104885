use std::fmt;
use std::rc::Rc;

use gloo::net::http::Request;
use riftbound_core::persist::CollapsedSets;
use riftbound_core::{prepare_catalog, CatalogCache, LegendRecord, LegendSet};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

const CATALOG_URL: &str = "./legends.json";

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LegendLoadError {
    Network(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for LegendLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegendLoadError::Network(err) => write!(f, "request failed: {err}"),
            LegendLoadError::Status(status) => write!(f, "server answered {status}"),
            LegendLoadError::Decode(err) => write!(f, "bad catalog: {err}"),
        }
    }
}

impl std::error::Error for LegendLoadError {}

thread_local! {
    static LEGEND_CATALOG: CatalogCache<Vec<LegendSet>, LegendLoadError> = CatalogCache::new();
}

async fn fetch_catalog() -> Result<Vec<LegendSet>, LegendLoadError> {
    let response = Request::get(CATALOG_URL)
        .send()
        .await
        .map_err(|err| LegendLoadError::Network(err.to_string()))?;
    if !response.ok() {
        return Err(LegendLoadError::Status(response.status()));
    }
    let records: Vec<LegendRecord> = response
        .json()
        .await
        .map_err(|err| LegendLoadError::Decode(err.to_string()))?;
    Ok(prepare_catalog(&records))
}

#[derive(Clone, PartialEq)]
enum CatalogView {
    Loading,
    Failed,
    Ready(Rc<Vec<LegendSet>>),
}

#[derive(Properties, PartialEq)]
pub(crate) struct LegendDialogProps {
    pub player_name: AttrValue,
    pub collapsed: Rc<CollapsedSets>,
    pub on_toggle_set: Callback<String>,
    pub on_select: Callback<String>,
    pub on_close: Callback<()>,
}

#[function_component(LegendDialog)]
pub(crate) fn legend_dialog(props: &LegendDialogProps) -> Html {
    let cache = LEGEND_CATALOG.with(CatalogCache::clone);
    let view = {
        let cache = cache.clone();
        use_state(move || match cache.cached() {
            Some(sets) => CatalogView::Ready(sets),
            None => CatalogView::Loading,
        })
    };

    {
        let view = view.clone();
        use_effect_with((), move |_| {
            if cache.cached().is_none() {
                spawn_local(async move {
                    match cache.get_or_load(fetch_catalog).await {
                        Ok(sets) => view.set(CatalogView::Ready(sets)),
                        Err(err) => {
                            gloo::console::warn!("legends: load failed", err.to_string());
                            view.set(CatalogView::Failed);
                        }
                    }
                });
            }
            || ()
        });
    }

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let backdrop_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |event: MouseEvent| {
            if event.target() == event.current_target() {
                on_close.emit(());
            }
        })
    };

    let body = match &*view {
        CatalogView::Loading => html! { <p class="legend-status">{ "Loading legends..." }</p> },
        CatalogView::Failed => html! { <p class="legend-status">{ "Failed to load legends" }</p> },
        CatalogView::Ready(sets) => sets
            .iter()
            .map(|set| {
                let collapsed = props.collapsed.get(&set.set_name).copied().unwrap_or(false);
                let toggle = {
                    let on_toggle_set = props.on_toggle_set.clone();
                    let set_name = set.set_name.clone();
                    Callback::from(move |_: MouseEvent| on_toggle_set.emit(set_name.clone()))
                };
                let cards: Html = if collapsed {
                    html! {}
                } else {
                    set.records
                        .iter()
                        .map(|record| {
                            let select = {
                                let on_select = props.on_select.clone();
                                let url = record.photo_url.clone();
                                Callback::from(move |_: MouseEvent| on_select.emit(url.clone()))
                            };
                            html! {
                                <button class="legend-option" title={record.name.clone()} onclick={select}>
                                    <img src={record.photo_url.clone()} alt={record.name.clone()} loading="lazy" />
                                </button>
                            }
                        })
                        .collect()
                };
                let set_class = if collapsed { "legend-set collapsed" } else { "legend-set" };
                html! {
                    <section class={set_class}>
                        <button class="legend-set-header" onclick={toggle}>
                            <span class="legend-set-arrow">{ if collapsed { "▸" } else { "▾" } }</span>
                            <span>{ set.label().to_string() }</span>
                        </button>
                        <div class="legend-grid">{ cards }</div>
                    </section>
                }
            })
            .collect(),
    };

    html! {
        <div class="modal-backdrop" onclick={backdrop_close}>
            <div class="modal legend-modal">
                <header class="modal-header">
                    <h2>{ format!("Choose a legend for {}", props.player_name) }</h2>
                    <button class="modal-close" onclick={close}>{ "×" }</button>
                </header>
                <div class="legend-body">{ body }</div>
            </div>
        </div>
    }
}
