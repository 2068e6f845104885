mod input;
mod legend_view;
mod storage;
mod yew_app;

use yew_app::App;

fn main() {
    yew::Renderer::<App>::new().render();
}
