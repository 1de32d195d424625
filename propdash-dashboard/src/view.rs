use crate::chart::{ChartData, ChartSpec, RenderMeta};

/// A renderer registered with the controller.
///
/// Views never filter or aggregate themselves. The controller derives each
/// view's [`ChartData`] from its [`ChartSpec`] and calls [`View::render`]
/// exactly once per filter change. A view that wants to change the filters
/// (a dropdown, a brush, a slider) reports it to its host, which passes a
/// `FilterUpdate` to `DashboardController::on_filter_change`; calling back into
/// the controller from inside `render` is not supported.
pub trait View {
    fn name(&self) -> &str;

    fn spec(&self) -> &ChartSpec;

    fn render(&mut self, data: &ChartData, meta: &RenderMeta);
}
