use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui;
use faceredact_core::pipeline::live_camera_use_case::LiveCameraUseCase;
use faceredact_core::shared::error::RedactError;
use faceredact_core::shared::frame::Frame;

const WINDOW_TITLE: &str = "faceredact (press q to quit)";

/// Shows redacted camera frames in a native window until the user presses
/// `q`/`Esc`, closes the window, or the camera stops delivering frames.
pub fn show(use_case: LiveCameraUseCase) -> Result<(), Box<dyn std::error::Error>> {
    let failure: Rc<RefCell<Option<RedactError>>> = Rc::new(RefCell::new(None));
    let app = LiveView {
        use_case,
        texture: None,
        failure: Rc::clone(&failure),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([960.0, 540.0]),
        ..Default::default()
    };

    eframe::run_native(WINDOW_TITLE, options, Box::new(|_cc| Box::new(app)))
        .map_err(|e| format!("camera window failed: {e}"))?;

    match failure.borrow_mut().take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

struct LiveView {
    use_case: LiveCameraUseCase,
    texture: Option<egui::TextureHandle>,
    failure: Rc<RefCell<Option<RedactError>>>,
}

impl LiveView {
    fn close(&mut self, ctx: &egui::Context) {
        self.use_case.stop();
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn upload(&mut self, ctx: &egui::Context, frame: &Frame) {
        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgb(size, frame.to_rgb().data());
        match self.texture.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("camera", image, egui::TextureOptions::LINEAR))
            }
        }
    }
}

impl eframe::App for LiveView {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let quit = ctx.input(|i| i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape));
        if quit {
            self.close(ctx);
            return;
        }

        match self.use_case.next_frame() {
            Ok(Some(frame)) => self.upload(ctx, &frame),
            Ok(None) => {
                self.close(ctx);
                return;
            }
            Err(e) => {
                *self.failure.borrow_mut() = Some(e);
                self.close(ctx);
                return;
            }
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                if let Some(texture) = &self.texture {
                    ui.centered_and_justified(|ui| {
                        ui.add(egui::Image::new(texture).shrink_to_fit());
                    });
                }
            });

        ctx.request_repaint();
    }
}
