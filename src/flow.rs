//! Application event loop.
//!
//! The loop is driven by the display: every `RedrawRequested` runs one frame
//! and requests the next. A frame is bracketed by the [`FrameMeter`] and
//! follows a fixed order:
//! 1. `meter.begin()`
//! 2. read the clock once and animate the scene to that time
//! 3. render and present
//! 4. `meter.end()`
//!
//! Everything runs on the event loop's thread. On native the GPU setup is
//! awaited with a tokio runtime; on the web it is spawned and handed back to the
//! loop as a [`FlowEvent::Initialized`] user event.

use std::{fmt::Debug, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    animation::{self, Clock},
    context::Context,
    scene::{DemoScene, SceneSettings},
    stats::{FrameMeter, FrameStats},
};

const TITLE: &str = "orbit-cubes";

/// Something a frame can be drawn to.
pub trait RenderSurface<M> {
    type Error;

    fn render_frame(&mut self, scene: &DemoScene, meter: &M) -> Result<(), Self::Error>;
}

impl RenderSurface<FrameStats> for Context {
    type Error = wgpu::SurfaceError;

    fn render_frame(&mut self, scene: &DemoScene, stats: &FrameStats) -> Result<(), Self::Error> {
        self.render(scene, stats)
    }
}

/// Something whose drawable size follows the window.
pub trait Viewport {
    fn resize(&mut self, width: u32, height: u32);
}

impl Viewport for Context {
    fn resize(&mut self, width: u32, height: u32) {
        Context::resize(self, width, height);
    }
}

/// Applies a new window size to the viewport and the camera lens.
///
/// Returns whether frames may be drawn at this size. A zero width or height
/// (a minimised window) leaves both untouched and pauses rendering until a
/// valid size arrives.
pub fn apply_resize<V: Viewport>(
    viewport: &mut V,
    scene: &mut DemoScene,
    width: u32,
    height: u32,
) -> bool {
    if width == 0 || height == 0 {
        log::debug!("ignoring resize to {}x{}", width, height);
        return false;
    }
    viewport.resize(width, height);
    scene.resize(width, height);
    true
}

/// Runs one frame. The meter is closed even when rendering fails.
pub fn run_frame<M, R>(
    meter: &mut M,
    scene: &mut DemoScene,
    elapsed: f64,
    surface: &mut R,
) -> Result<(), R::Error>
where
    M: FrameMeter,
    R: RenderSurface<M>,
{
    meter.begin();
    animation::animate(scene, elapsed);
    let result = surface.render_frame(scene, meter);
    meter.end();
    result
}

/// GPU context, scene and frame bookkeeping of a running app.
pub struct AppState {
    pub(crate) ctx: Context,
    scene: DemoScene,
    clock: Clock,
    stats: FrameStats,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, settings: SceneSettings) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let scene = DemoScene::new(settings, size.width.max(1), size.height.max(1));
        let ctx = Context::new(window, scene.graph()).await?;
        Ok(Self {
            ctx,
            scene,
            clock: Clock::new(),
            stats: FrameStats::new(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.is_surface_configured = apply_resize(&mut self.ctx, &mut self.scene, width, height);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let elapsed = self.clock.elapsed();
        let result = run_frame(&mut self.stats, &mut self.scene, elapsed, &mut self.ctx);
        if self.stats.take_fresh_sample() {
            self.ctx
                .window
                .set_title(&format!("{} | {}", TITLE, self.stats.label()));
        }
        result
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(anyhow::Result<AppState>),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(Ok(_)) => f.write_str("Initialized(Ok)"),
            Self::Initialized(Err(e)) => f.debug_tuple("Initialized").field(e).finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    settings: SceneSettings,
    state: Option<AppState>,
    initializing: bool,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, settings: SceneSettings) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            settings,
            state: None,
            initializing: false,
            error: None,
        })
    }

    /// Keeps the first startup error and stops the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop, state: anyhow::Result<AppState>) {
        self.initializing = false;
        match state {
            Ok(mut state) => {
                // Important: Trigger a resize and redraw now that we are initialized
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                log::info!("Initialized");
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e.context("App initialization failed")),
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.initializing {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(TITLE);

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            window_attributes = match canvas {
                Some(canvas) => window_attributes.with_canvas(Some(canvas.unchecked_into())),
                None => window_attributes.with_append(true),
            };
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Cannot create the window"));
                return;
            }
        };

        self.initializing = true;
        let init_future = AppState::new(window, self.settings.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let state = self.async_runtime.block_on(init_future);
            self.start(event_loop, state);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = init_future.await;
                if proxy.send_event(FlowEvent::Initialized(state)).is_err() {
                    log::error!("Event loop closed before initialization finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized(state) => self.start(event_loop, state),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match state.render() {
                Ok(_) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                }
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            },
            _ => {}
        }
    }
}

/// Opens the window and runs the demo with the default settings until it is closed.
pub fn run() -> anyhow::Result<()> {
    run_with(SceneSettings::default())
}

pub fn run_with(settings: SceneSettings) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)?;
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, settings)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
