use crate::device::Frame;
use crate::surface::{Action, ControlSurface, HeldKeys};
use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::render::{Texture, TextureCreator, WindowCanvas};
use sdl2::video::WindowContext;
use sdl2::EventPump;
use std::error::Error;

/// The operator-facing SDL window: presents frames and exposes the keyboard
/// as held-key state plus discrete release events.
///
/// Bindings: W/S forward/backward, A/D left/right,
/// Space/C up/down, Q/E clockwise/counter-clockwise; 1 takeoff, 0 land,
/// Delete emergency, Escape quit.
pub struct Screen {
	canvas: WindowCanvas,
	texture_creator: TextureCreator<WindowContext>,
	/// Streaming texture reused across ticks, recreated only when the
	/// decoder's output geometry changes.
	texture: Option<Texture>,
	texture_size: Option<(u32, u32)>,
	event_pump: EventPump,
}

fn texture_is_stale(cached_size: Option<(u32, u32)>, frame: &Frame) -> bool {
	cached_size != Some((frame.width, frame.height))
}

impl Screen {
	pub fn open(
		title: &str,
		width: u32,
		height: u32,
		background: [u8; 3],
	) -> Result<Self, Box<dyn Error>> {
		let context = sdl2::init()?;
		let video = context.video()?;

		let window = video
			.window(title, width, height)
			.position_centered()
			.build()
			.map_err(|e| e.to_string())?;

		let mut canvas = window.into_canvas().build().map_err(|e| e.to_string())?;

		canvas.set_draw_color(Color::RGB(background[0], background[1], background[2]));
		canvas.clear();
		canvas.present();

		let texture_creator = canvas.texture_creator();
		let event_pump = context.event_pump()?;

		Ok(Self {
			canvas,
			texture_creator,
			texture: None,
			texture_size: None,
			event_pump,
		})
	}
}

impl ControlSurface for Screen {
	fn poll_actions(&mut self) -> Vec<Action> {
		let mut actions = Vec::new();

		for event in self.event_pump.poll_iter() {
			match event {
				Event::Quit { .. } => actions.push(Action::Quit),
				Event::KeyUp {
					keycode: Some(keycode),
					..
				} => match keycode {
					Keycode::Escape => actions.push(Action::Quit),
					Keycode::Num1 => actions.push(Action::TakeOff),
					Keycode::Num0 => actions.push(Action::Land),
					Keycode::Delete => actions.push(Action::Emergency),
					_ => {}
				},
				_ => {}
			}
		}

		actions
	}

	fn held_keys(&self) -> HeldKeys {
		let keyboard = self.event_pump.keyboard_state();

		HeldKeys {
			forward: keyboard.is_scancode_pressed(Scancode::W),
			backward: keyboard.is_scancode_pressed(Scancode::S),
			left: keyboard.is_scancode_pressed(Scancode::A),
			right: keyboard.is_scancode_pressed(Scancode::D),
			up: keyboard.is_scancode_pressed(Scancode::Space),
			down: keyboard.is_scancode_pressed(Scancode::C),
			yaw_cw: keyboard.is_scancode_pressed(Scancode::Q),
			yaw_ccw: keyboard.is_scancode_pressed(Scancode::E),
		}
	}

	fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn Error>> {
		if texture_is_stale(self.texture_size, frame) {
			let texture = self
				.texture_creator
				.create_texture_streaming(PixelFormatEnum::RGB24, frame.width, frame.height)
				.map_err(|e| e.to_string())?;

			self.texture = Some(texture);
			self.texture_size = Some((frame.width, frame.height));
		}

		if let Some(texture) = self.texture.as_mut() {
			texture.update(None, &frame.rgb, (frame.width * 3) as usize)?;

			self.canvas.clear();
			self.canvas.copy(texture, None, None)?;
			self.canvas.present();
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::device::Frame;
	use crate::screen::texture_is_stale;

	#[test]
	fn texture_is_reused_while_geometry_is_stable() {
		let frame = Frame::new(960, 720);

		assert!(texture_is_stale(None, &frame));
		assert!(!texture_is_stale(Some((960, 720)), &frame));
	}

	#[test]
	fn geometry_change_invalidates_the_texture() {
		let frame = Frame::new(1280, 720);

		assert!(texture_is_stale(Some((960, 720)), &frame));
	}
}
