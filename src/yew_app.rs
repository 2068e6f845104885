use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::timers::callback::Timeout;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use riftbound_core::{
    AnchorName, AnchorSet, DragController, DragFrame, DragStart, LayoutRenderer, PlayerCount,
    PlayerIndex, PointerPosition, Rotation, Scoreboard, TileGeometry, MAX_PLAYERS, MIN_PLAYERS,
};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent};
use yew::prelude::*;

use crate::input::{
    element_origin, element_surface, guard_touch_start, mouse_pointer, tile_of, touch_pointer,
    TouchPhase,
};
use crate::legend_view::LegendDialog;
use crate::storage::LocalStorageStore;

const ORIENTATION_SETTLE_MS: u32 = 100;
const LEGEND_SHADE: &str = "rgba(0, 0, 0, 0.55)";

type Board = Scoreboard<LocalStorageStore>;

#[derive(Clone, Copy, PartialEq)]
struct DragView {
    player: PlayerIndex,
    active: AnchorSet,
    frame: Option<DragFrame>,
}

/// Everything the window-level drag listeners need. Built when a drag starts
/// and dropped with the listeners when it ends.
#[derive(Clone)]
struct DragContext {
    board: Rc<RefCell<Board>>,
    drag: Rc<RefCell<DragController>>,
    view: UseStateHandle<Option<DragView>>,
    player: PlayerIndex,
    active: AnchorSet,
}

impl DragContext {
    fn on_move(&self, pointer: PointerPosition) {
        let frame = self
            .drag
            .borrow()
            .drag_move(pointer, self.board.borrow().slot_manager());
        if let Some(frame) = frame {
            self.view.set(Some(DragView {
                player: self.player,
                active: self.active,
                frame: Some(frame),
            }));
        }
    }

    fn on_release(&self, pointer: PointerPosition) {
        let outcome = {
            let mut board = self.board.borrow_mut();
            self.drag.borrow_mut().release(pointer, &mut *board)
        };
        if let Some(outcome) = outcome {
            if let Some(target) = outcome.target.filter(|_| outcome.committed) {
                gloo::console::log!(
                    "drag: committed",
                    format!("player {} -> {}", outcome.player + 1, target)
                );
            }
        }
        self.view.set(None);
    }

    fn on_cancel(&self) {
        self.drag.borrow_mut().cancel();
        self.view.set(None);
    }

    fn attach(self, window: &web_sys::Window) -> Vec<EventListener> {
        let mouse_move = {
            let ctx = self.clone();
            EventListener::new_with_options(
                window,
                "mousemove",
                capture_options(),
                move |event: &Event| {
                    if let Some(event) = event.dyn_ref::<MouseEvent>() {
                        ctx.on_move(mouse_pointer(event));
                    }
                },
            )
        };
        let touch_move = {
            let ctx = self.clone();
            EventListener::new_with_options(
                window,
                "touchmove",
                capture_options(),
                move |event: &Event| {
                    if let Some(event) = event.dyn_ref::<TouchEvent>() {
                        event.prevent_default();
                        if let Some(pointer) = touch_pointer(event, TouchPhase::Active) {
                            ctx.on_move(pointer);
                        }
                    }
                },
            )
        };
        let mouse_up = {
            let ctx = self.clone();
            EventListener::new_with_options(
                window,
                "mouseup",
                capture_options(),
                move |event: &Event| {
                    if let Some(event) = event.dyn_ref::<MouseEvent>() {
                        ctx.on_release(mouse_pointer(event));
                    }
                },
            )
        };
        let touch_end = {
            let ctx = self.clone();
            EventListener::new_with_options(
                window,
                "touchend",
                capture_options(),
                move |event: &Event| {
                    if let Some(event) = event.dyn_ref::<TouchEvent>() {
                        match touch_pointer(event, TouchPhase::Lifted) {
                            Some(pointer) => ctx.on_release(pointer),
                            None => ctx.on_cancel(),
                        }
                    }
                },
            )
        };
        let touch_cancel = EventListener::new_with_options(
            window,
            "touchcancel",
            capture_options(),
            move |_event: &Event| self.on_cancel(),
        );
        vec![mouse_move, touch_move, mouse_up, touch_end, touch_cancel]
    }
}

fn capture_options() -> EventListenerOptions {
    EventListenerOptions {
        phase: EventListenerPhase::Capture,
        passive: false,
    }
}

fn tile_style(geometry: &TileGeometry, frame: Option<&DragFrame>) -> String {
    let mut geometry = *geometry;
    if let Some(frame) = frame {
        geometry.left = frame.tile_left;
        geometry.top = frame.tile_top;
    }
    geometry.style()
}

/// Quarter turns lay the tile content across the region's long axis.
fn content_style(geometry: &TileGeometry) -> String {
    match geometry.rotation {
        Rotation::Quarter | Rotation::ThreeQuarter => format!(
            "width: {:.2}px; height: {:.2}px;",
            geometry.height, geometry.width
        ),
        Rotation::Upright | Rotation::Half => "width: 100%; height: 100%;".to_string(),
    }
}

fn legend_style(photo_url: Option<&str>) -> Option<String> {
    photo_url.map(|url| {
        format!(
            "background-image: linear-gradient({LEGEND_SHADE}, {LEGEND_SHADE}), url(\"{}\"); \
             background-size: cover; background-position: center;",
            url.replace('"', "%22")
        )
    })
}

fn anchor_point_style(anchor: AnchorName) -> String {
    let (x, y) = anchor.representative_point();
    format!("left: {:.2}%; top: {:.2}%;", x * 100.0, y * 100.0)
}

fn seeded_rng() -> SmallRng {
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64 ^ js_sys::Date::now() as u64;
    SmallRng::seed_from_u64(seed)
}

#[function_component(App)]
pub(crate) fn app() -> Html {
    let board = use_mut_ref(|| Scoreboard::load(LocalStorageStore));
    let layout = use_mut_ref(LayoutRenderer::new);
    let drag = use_mut_ref(DragController::new);
    let rng = use_mut_ref(seeded_rng);
    let drag_view = use_state(|| None::<DragView>);
    let reset_open = use_state(|| false);
    let starter = use_state(|| None::<PlayerIndex>);
    let legend_for = use_state(|| None::<PlayerIndex>);
    let game_ref = use_node_ref();
    let force_update = use_force_update();

    let measure = {
        let game_ref = game_ref.clone();
        let layout = layout.clone();
        Rc::new(move || {
            if let Some(element) = game_ref.cast::<Element>() {
                layout.borrow_mut().measure(element_surface(&element));
            }
        })
    };

    {
        let measure = measure.clone();
        let force_update = force_update.clone();
        let game_ref = game_ref.clone();
        use_effect_with((), move |_| {
            measure();
            force_update.force_update();
            let touch_guard = game_ref.cast::<Element>().map(|game| {
                EventListener::new_with_options(
                    &game,
                    "touchstart",
                    EventListenerOptions::enable_prevent_default(),
                    guard_touch_start,
                )
            });
            let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
            let listeners = web_sys::window().map(|window| {
                let resize = {
                    let measure = measure.clone();
                    let force_update = force_update.clone();
                    EventListener::new(&window, "resize", move |_event| {
                        measure();
                        force_update.force_update();
                    })
                };
                let orientation = {
                    let pending = pending.clone();
                    EventListener::new(&window, "orientationchange", move |_event| {
                        let measure = measure.clone();
                        let force_update = force_update.clone();
                        let timer = Timeout::new(ORIENTATION_SETTLE_MS, move || {
                            measure();
                            force_update.force_update();
                        });
                        *pending.borrow_mut() = Some(timer);
                    })
                };
                (resize, orientation)
            });
            move || {
                drop(listeners);
                drop(touch_guard);
                pending.borrow_mut().take();
            }
        });
    }

    let view_value = *drag_view;
    let dragging = view_value.map(|view| (view.player, view.active));
    {
        let board = board.clone();
        let drag = drag.clone();
        let view = drag_view.clone();
        use_effect_with(dragging, move |dragging| {
            let listeners = dragging.and_then(|(player, active)| {
                let window = web_sys::window()?;
                let ctx = DragContext {
                    board,
                    drag,
                    view,
                    player,
                    active,
                };
                Some(ctx.attach(&window))
            });
            move || drop(listeners)
        });
    }

    let start_drag = {
        let board = board.clone();
        let layout = layout.clone();
        let drag = drag.clone();
        let drag_view = drag_view.clone();
        let measure = measure.clone();
        Rc::new(move |player: PlayerIndex, pointer: PointerPosition, tile: Option<Element>| {
            let Some(tile) = tile else {
                return;
            };
            measure();
            let start = drag.borrow_mut().begin(
                player,
                pointer,
                element_origin(&tile),
                layout.borrow().surface(),
                board.borrow().slot_manager(),
            );
            match start {
                DragStart::Started { active } => drag_view.set(Some(DragView {
                    player,
                    active,
                    frame: None,
                })),
                DragStart::SurfaceUnmeasured => {
                    gloo::console::warn!("drag: play surface not measured yet");
                }
                DragStart::Busy | DragStart::NotSeated => {}
            }
        })
    };

    let cancel_drag = {
        let drag = drag.clone();
        let drag_view = drag_view.clone();
        move || {
            if drag.borrow_mut().cancel().is_some() {
                drag_view.set(None);
            }
        }
    };

    let count_buttons: Html = (MIN_PLAYERS..=MAX_PLAYERS)
        .filter_map(|value| PlayerCount::new(value).ok())
        .map(|count| {
            let active = board.borrow().player_count() == count;
            let onclick = {
                let board = board.clone();
                let force_update = force_update.clone();
                let cancel_drag = cancel_drag.clone();
                Callback::from(move |_: MouseEvent| {
                    cancel_drag();
                    if board.borrow_mut().set_player_count(count) {
                        force_update.force_update();
                    }
                })
            };
            html! {
                <button class={classes!("count-button", active.then_some("active"))} {onclick}>
                    { count.to_string() }
                </button>
            }
        })
        .collect();

    let open_reset = {
        let reset_open = reset_open.clone();
        Callback::from(move |_: MouseEvent| reset_open.set(true))
    };
    let pick_starter = {
        let board = board.clone();
        let rng = rng.clone();
        let starter = starter.clone();
        Callback::from(move |_: MouseEvent| {
            let player = board.borrow().pick_random_player(&mut *rng.borrow_mut());
            starter.set(Some(player));
        })
    };

    let placements = layout.borrow().position_all(board.borrow().slot_manager());
    let tiles: Html = placements
        .iter()
        .map(|placement| {
            let player = placement.player;
            let geometry = placement.geometry;
            let board_ref = board.borrow();
            let dragged = view_value.filter(|view| view.player == player);
            let style = tile_style(&geometry, dragged.and_then(|view| view.frame).as_ref());

            let on_mouse_down = {
                let start_drag = start_drag.clone();
                Callback::from(move |event: MouseEvent| {
                    if event.button() != 0 {
                        return;
                    }
                    event.prevent_default();
                    start_drag(player, mouse_pointer(&event), tile_of(&event));
                })
            };
            let on_touch_start = {
                let start_drag = start_drag.clone();
                Callback::from(move |event: TouchEvent| {
                    let Some(pointer) = touch_pointer(&event, TouchPhase::Active) else {
                        return;
                    };
                    start_drag(player, pointer, tile_of(&event));
                })
            };
            let score_button = |delta: i32| {
                let board = board.clone();
                let force_update = force_update.clone();
                Callback::from(move |event: MouseEvent| {
                    event.stop_propagation();
                    if board.borrow_mut().change_score(player, delta) {
                        force_update.force_update();
                    }
                })
            };
            let swallow_mouse = Callback::from(|event: MouseEvent| event.stop_propagation());
            let swallow_touch = Callback::from(|event: TouchEvent| event.stop_propagation());
            let on_name_change = {
                let board = board.clone();
                let force_update = force_update.clone();
                Callback::from(move |event: Event| {
                    let Some(input) = event.target_dyn_into::<HtmlInputElement>() else {
                        return;
                    };
                    let mut board = board.borrow_mut();
                    board.set_name(player, &input.value());
                    input.set_value(board.name(player).unwrap_or_default());
                    force_update.force_update();
                })
            };
            let on_name_key = Callback::from(|event: KeyboardEvent| {
                if event.key() == "Enter" {
                    if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                        let _ = input.blur();
                    }
                }
            });
            let open_legend = {
                let legend_for = legend_for.clone();
                Callback::from(move |event: MouseEvent| {
                    event.stop_propagation();
                    legend_for.set(Some(player));
                })
            };

            html! {
                <div
                    key={player.to_string()}
                    class={classes!(
                        "player-tile",
                        geometry.rotation.css_class(),
                        dragged.is_some().then_some("dragging"),
                    )}
                    data-player={player.to_string()}
                    data-anchor={placement.anchor.as_str()}
                    style={style}
                >
                    <div class="tile-content" style={content_style(&geometry)}>
                        <button class="score-button minus" onclick={score_button(-1)}>{ "−" }</button>
                        <div
                            class="tile-centre"
                            style={legend_style(board_ref.legend(player))}
                            onmousedown={on_mouse_down}
                            ontouchstart={on_touch_start}
                        >
                            <input
                                class="player-name"
                                type="text"
                                maxlength="20"
                                placeholder={board_ref.display_name(player)}
                                value={board_ref.name(player).unwrap_or_default().to_string()}
                                onchange={on_name_change}
                                onkeydown={on_name_key}
                                onmousedown={swallow_mouse.clone()}
                                ontouchstart={swallow_touch.clone()}
                            />
                            <div class="score">{ board_ref.score(player) }</div>
                            <button
                                class="legend-button"
                                onclick={open_legend}
                                onmousedown={swallow_mouse}
                                ontouchstart={swallow_touch}
                            >
                                { if board_ref.legend(player).is_some() { "Change legend" } else { "Choose legend" } }
                            </button>
                        </div>
                        <button class="score-button plus" onclick={score_button(1)}>{ "+" }</button>
                    </div>
                </div>
            }
        })
        .collect();

    let anchor_points: Html = match view_value {
        Some(view) => {
            let highlight = view.frame.and_then(|frame| frame.highlight);
            AnchorName::ALL
                .iter()
                .map(|anchor| {
                    html! {
                        <div
                            class={classes!(
                                "anchor-point",
                                view.active.contains(*anchor).then_some("active"),
                                (highlight == Some(*anchor)).then_some("highlight"),
                            )}
                            data-anchor={anchor.as_str()}
                            style={anchor_point_style(*anchor)}
                        />
                    }
                })
                .collect()
        }
        None => html! {},
    };
    let preview = match view_value.and_then(|view| view.frame).and_then(|frame| frame.preview) {
        Some(geometry) => html! {
            <div class={classes!("anchor-preview", geometry.rotation.css_class())} style={geometry.style()} />
        },
        None => html! {},
    };

    let reset_dialog = if *reset_open {
        let close = {
            let reset_open = reset_open.clone();
            Callback::from(move |_: MouseEvent| reset_open.set(false))
        };
        let backdrop_close = {
            let reset_open = reset_open.clone();
            Callback::from(move |event: MouseEvent| {
                if event.target() == event.current_target() {
                    reset_open.set(false);
                }
            })
        };
        let reset_scores = {
            let board = board.clone();
            let reset_open = reset_open.clone();
            Callback::from(move |_: MouseEvent| {
                board.borrow_mut().reset_scores();
                reset_open.set(false);
            })
        };
        let reset_all = {
            let board = board.clone();
            let reset_open = reset_open.clone();
            let cancel_drag = cancel_drag.clone();
            Callback::from(move |_: MouseEvent| {
                cancel_drag();
                board.borrow_mut().reset_all();
                reset_open.set(false);
            })
        };
        html! {
            <div class="modal-backdrop" onclick={backdrop_close}>
                <div class="modal reset-modal">
                    <h2>{ "Reset game" }</h2>
                    <button class="reset-scores" onclick={reset_scores}>{ "Reset scores" }</button>
                    <button class="reset-all" onclick={reset_all}>{ "Reset all" }</button>
                    <button class="modal-cancel" onclick={close}>{ "Cancel" }</button>
                </div>
            </div>
        }
    } else {
        html! {}
    };

    let starter_dialog = match *starter {
        Some(player) => {
            let close = {
                let starter = starter.clone();
                Callback::from(move |_: MouseEvent| starter.set(None))
            };
            let backdrop_close = {
                let starter = starter.clone();
                Callback::from(move |event: MouseEvent| {
                    if event.target() == event.current_target() {
                        starter.set(None);
                    }
                })
            };
            html! {
                <div class="modal-backdrop" onclick={backdrop_close}>
                    <div class="modal starter-modal">
                        <p class="starter-name">{ format!("{} starts!", board.borrow().display_name(player)) }</p>
                        <button class="modal-close" onclick={close}>{ "OK" }</button>
                    </div>
                </div>
            }
        }
        None => html! {},
    };

    let legend_dialog = match *legend_for {
        Some(player) => {
            let board_ref = board.borrow();
            let collapsed = Rc::new(board_ref.collapsed_sets().clone());
            let on_toggle_set = {
                let board = board.clone();
                let force_update = force_update.clone();
                Callback::from(move |set_name: String| {
                    board.borrow_mut().toggle_set_collapsed(&set_name);
                    force_update.force_update();
                })
            };
            let on_select = {
                let board = board.clone();
                let legend_for = legend_for.clone();
                Callback::from(move |photo_url: String| {
                    board.borrow_mut().set_legend(player, &photo_url);
                    legend_for.set(None);
                })
            };
            let on_close = {
                let legend_for = legend_for.clone();
                Callback::from(move |_: ()| legend_for.set(None))
            };
            html! {
                <LegendDialog
                    player_name={AttrValue::from(board_ref.display_name(player))}
                    {collapsed}
                    {on_toggle_set}
                    {on_select}
                    {on_close}
                />
            }
        }
        None => html! {},
    };

    html! {
        <div class="app">
            <header class="app-header">
                <div class="player-count">{ count_buttons }</div>
                <button class="random-starter" onclick={pick_starter}>{ "Who starts?" }</button>
                <button class="reset-button" onclick={open_reset}>{ "Reset" }</button>
            </header>
            <main
                class={classes!("game-area", view_value.is_some().then_some("dragging"))}
                ref={game_ref}
            >
                { anchor_points }
                { preview }
                { tiles }
            </main>
            { reset_dialog }
            { starter_dialog }
            { legend_dialog }
        </div>
    }
}
