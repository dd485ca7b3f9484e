//! A [`Gl`] implementation that records calls instead of talking to a driver.
//!
//! Object names come from a single counter so every handle is unique across
//! kinds. A small amount of validation mirrors what a real context reports
//! through `glGetError`.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use super::Gl;

/// Location the recording context hands out for a named attribute.
pub const POSITION_LOCATION: u32 = 0;
pub const COLOR_LOCATION: u32 = 1;
pub const UV_LOCATION: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Draw {
        mode: u32,
        count: i32,
        element_type: u32,
        enabled: BTreeSet<u32>,
        program: Option<u32>,
        texture: Option<u32>,
    },
    ConstantAttrib2 { index: u32, value: [f32; 2] },
    ConstantAttrib4 { index: u32, value: [f32; 4] },
    Uniform1i { name: String, value: i32 },
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,
    buffers: BTreeSet<u32>,
    vertex_arrays: BTreeSet<u32>,
    textures: BTreeSet<u32>,
    shaders: BTreeSet<u32>,
    programs: BTreeSet<u32>,
    deleted: Vec<u32>,
    double_deletes: usize,
    bound_buffers: HashMap<u32, u32>,
    bound_vertex_array: Option<u32>,
    // Element bindings per vertex array; key 0 is the state with no array bound.
    vao_elements: HashMap<u32, u32>,
    bound_texture: Option<u32>,
    current_program: Option<u32>,
    buffer_data: HashMap<u32, Vec<u8>>,
    texture_sizes: HashMap<u32, (i32, i32)>,
    texture_params: HashMap<(u32, u32), i32>,
    mipmaps: usize,
    shader_sources: HashMap<u32, String>,
    compiled: HashMap<u32, bool>,
    attachments: HashMap<u32, BTreeSet<u32>>,
    linked: HashMap<u32, bool>,
    uniform_names: HashMap<u32, String>,
    enabled: BTreeSet<u32>,
    errors: Vec<u32>,
    calls: Vec<Call>,
}

impl State {
    fn alloc(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    fn vao_key(&self) -> u32 {
        self.bound_vertex_array.unwrap_or(0)
    }

    fn binding(&self, target: u32) -> Option<u32> {
        if target == glow::ELEMENT_ARRAY_BUFFER {
            self.vao_elements.get(&self.vao_key()).copied()
        } else {
            self.bound_buffers.get(&target).copied()
        }
    }

    fn set_binding(&mut self, target: u32, buffer: Option<u32>) {
        let (map, key) = if target == glow::ELEMENT_ARRAY_BUFFER {
            let key = self.vao_key();
            (&mut self.vao_elements, key)
        } else {
            (&mut self.bound_buffers, target)
        };
        match buffer {
            Some(b) => {
                map.insert(key, b);
            }
            None => {
                map.remove(&key);
            }
        }
    }

    fn delete(&mut self, name: u32, live: fn(&mut State) -> &mut BTreeSet<u32>) {
        if live(self).remove(&name) {
            self.deleted.push(name);
        } else {
            self.double_deletes += 1;
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingGl {
    state: RefCell<State>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push(code);
    }

    pub fn live_objects(&self) -> usize {
        let s = self.state.borrow();
        s.buffers.len() + s.vertex_arrays.len() + s.textures.len() + s.shaders.len() + s.programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn is_deleted(&self, name: u32) -> bool {
        self.state.borrow().deleted.contains(&name)
    }

    pub fn double_deletes(&self) -> usize {
        self.state.borrow().double_deletes
    }

    pub fn buffer_bytes(&self, buffer: u32) -> Vec<u8> {
        self.state
            .borrow()
            .buffer_data
            .get(&buffer)
            .cloned()
            .unwrap_or_default()
    }

    pub fn texture_size(&self, texture: u32) -> Option<(i32, i32)> {
        self.state.borrow().texture_sizes.get(&texture).copied()
    }

    pub fn texture_param(&self, texture: u32, parameter: u32) -> Option<i32> {
        self.state
            .borrow()
            .texture_params
            .get(&(texture, parameter))
            .copied()
    }

    pub fn mipmap_generations(&self) -> usize {
        self.state.borrow().mipmaps
    }

    pub fn enabled_arrays(&self) -> BTreeSet<u32> {
        self.state.borrow().enabled.clone()
    }

    pub fn bound_vertex_array(&self) -> Option<u32> {
        self.state.borrow().bound_vertex_array
    }

    /// Element buffer recorded in `vertex_array`'s state.
    pub fn element_binding(&self, vertex_array: u32) -> Option<u32> {
        self.state.borrow().vao_elements.get(&vertex_array).copied()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn draws(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Draw { .. }))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }
}

impl Gl for RecordingGl {
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type Shader = u32;
    type Program = u32;
    type UniformLocation = u32;

    unsafe fn create_buffer(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let name = s.alloc();
        s.buffers.insert(name);
        Ok(name)
    }

    unsafe fn delete_buffer(&self, buffer: u32) {
        let mut s = self.state.borrow_mut();
        s.delete(buffer, |s| &mut s.buffers);
        s.bound_buffers.retain(|_, b| *b != buffer);
        // Only the bound vertex array loses its reference.
        let key = s.vao_key();
        if s.vao_elements.get(&key) == Some(&buffer) {
            s.vao_elements.remove(&key);
        }
    }

    unsafe fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        let mut s = self.state.borrow_mut();
        match buffer {
            Some(b) if !s.buffers.contains(&b) => s.errors.push(glow::INVALID_OPERATION),
            b => s.set_binding(target, b),
        }
    }

    unsafe fn buffer_data_u8_slice(&self, target: u32, data: &[u8], _usage: u32) {
        let mut s = self.state.borrow_mut();
        let bound = s.binding(target);
        match bound {
            Some(b) => {
                s.buffer_data.insert(b, data.to_vec());
            }
            None => s.errors.push(glow::INVALID_OPERATION),
        }
    }

    unsafe fn create_vertex_array(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let name = s.alloc();
        s.vertex_arrays.insert(name);
        Ok(name)
    }

    unsafe fn delete_vertex_array(&self, vertex_array: u32) {
        let mut s = self.state.borrow_mut();
        s.delete(vertex_array, |s| &mut s.vertex_arrays);
        s.vao_elements.remove(&vertex_array);
        if s.bound_vertex_array == Some(vertex_array) {
            s.bound_vertex_array = None;
        }
    }

    unsafe fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        let mut s = self.state.borrow_mut();
        match vertex_array {
            Some(v) if !s.vertex_arrays.contains(&v) => s.errors.push(glow::INVALID_OPERATION),
            v => s.bound_vertex_array = v,
        }
    }

    unsafe fn create_texture(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let name = s.alloc();
        s.textures.insert(name);
        Ok(name)
    }

    unsafe fn delete_texture(&self, texture: u32) {
        let mut s = self.state.borrow_mut();
        s.delete(texture, |s| &mut s.textures);
        if s.bound_texture == Some(texture) {
            s.bound_texture = None;
        }
    }

    unsafe fn active_texture(&self, _unit: u32) {}

    unsafe fn bind_texture(&self, _target: u32, texture: Option<u32>) {
        let mut s = self.state.borrow_mut();
        match texture {
            Some(t) if !s.textures.contains(&t) => s.errors.push(glow::INVALID_OPERATION),
            t => s.bound_texture = t,
        }
    }

    unsafe fn tex_image_2d_rgba8(&self, _target: u32, width: i32, height: i32, pixels: &[u8]) {
        let mut s = self.state.borrow_mut();
        let bound = s.bound_texture;
        match bound {
            Some(t) if pixels.len() >= (width * height * 4) as usize => {
                s.texture_sizes.insert(t, (width, height));
            }
            Some(_) => s.errors.push(glow::INVALID_OPERATION),
            None => s.errors.push(glow::INVALID_OPERATION),
        }
    }

    unsafe fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        let mut s = self.state.borrow_mut();
        let bound = s.bound_texture;
        if let Some(t) = bound {
            s.texture_params.insert((t, parameter), value);
        }
    }

    unsafe fn generate_mipmap(&self, _target: u32) {
        self.state.borrow_mut().mipmaps += 1;
    }

    unsafe fn create_shader(&self, _shader_type: u32) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let name = s.alloc();
        s.shaders.insert(name);
        Ok(name)
    }

    unsafe fn shader_source(&self, shader: u32, source: &str) {
        self.state
            .borrow_mut()
            .shader_sources
            .insert(shader, source.to_string());
    }

    /// Source compiles unless it is blank or contains `#error`.
    unsafe fn compile_shader(&self, shader: u32) {
        let mut s = self.state.borrow_mut();
        let ok = s
            .shader_sources
            .get(&shader)
            .is_some_and(|src| !src.trim().is_empty() && !src.contains("#error"));
        s.compiled.insert(shader, ok);
    }

    unsafe fn get_shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .compiled
            .get(&shader)
            .copied()
            .unwrap_or(false)
    }

    unsafe fn get_shader_info_log(&self, shader: u32) -> String {
        if unsafe { self.get_shader_compile_status(shader) } {
            String::new()
        } else {
            format!("0:1(1): error: shader {shader} failed to compile")
        }
    }

    unsafe fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().delete(shader, |s| &mut s.shaders);
    }

    unsafe fn create_program(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let name = s.alloc();
        s.programs.insert(name);
        Ok(name)
    }

    unsafe fn attach_shader(&self, program: u32, shader: u32) {
        self.state
            .borrow_mut()
            .attachments
            .entry(program)
            .or_default()
            .insert(shader);
    }

    unsafe fn detach_shader(&self, program: u32, shader: u32) {
        let mut s = self.state.borrow_mut();
        let removed = s
            .attachments
            .get_mut(&program)
            .is_some_and(|set| set.remove(&shader));
        if !removed {
            s.errors.push(glow::INVALID_OPERATION);
        }
    }

    /// Links when at least two attached shaders compiled.
    unsafe fn link_program(&self, program: u32) {
        let mut s = self.state.borrow_mut();
        let compiled = s
            .attachments
            .get(&program)
            .map(|set| {
                set.iter()
                    .filter(|sh| s.compiled.get(*sh).copied().unwrap_or(false))
                    .count()
            })
            .unwrap_or(0);
        s.linked.insert(program, compiled >= 2);
    }

    unsafe fn get_program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .linked
            .get(&program)
            .copied()
            .unwrap_or(false)
    }

    unsafe fn get_program_info_log(&self, program: u32) -> String {
        if unsafe { self.get_program_link_status(program) } {
            String::new()
        } else {
            "error: linking with uncompiled shader".to_string()
        }
    }

    unsafe fn delete_program(&self, program: u32) {
        let mut s = self.state.borrow_mut();
        s.delete(program, |s| &mut s.programs);
        if s.current_program == Some(program) {
            s.current_program = None;
        }
    }

    unsafe fn use_program(&self, program: Option<u32>) {
        let mut s = self.state.borrow_mut();
        match program {
            Some(p) if !s.programs.contains(&p) => s.errors.push(glow::INVALID_OPERATION),
            p => s.current_program = p,
        }
    }

    unsafe fn get_uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let mut s = self.state.borrow_mut();
        if !s.linked.get(&program).copied().unwrap_or(false) {
            return None;
        }
        let location = s.alloc();
        s.uniform_names.insert(location, name.to_string());
        Some(location)
    }

    unsafe fn uniform_1_i32(&self, location: Option<&u32>, x: i32) {
        let mut s = self.state.borrow_mut();
        if let Some(name) = location.and_then(|l| s.uniform_names.get(l)).cloned() {
            s.calls.push(Call::Uniform1i { name, value: x });
        }
    }

    /// Only linked programs expose attributes, at fixed locations.
    unsafe fn get_attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        if !unsafe { self.get_program_link_status(program) } {
            return None;
        }
        match name {
            "in_pos" => Some(POSITION_LOCATION),
            "in_col" => Some(COLOR_LOCATION),
            "in_UV" => Some(UV_LOCATION),
            _ => None,
        }
    }

    unsafe fn enable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().enabled.insert(index);
    }

    unsafe fn disable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().enabled.remove(&index);
    }

    unsafe fn vertex_attrib_pointer_f32(
        &self,
        _index: u32,
        size: i32,
        _data_type: u32,
        _normalized: bool,
        _stride: i32,
        _offset: i32,
    ) {
        let mut s = self.state.borrow_mut();
        // The core profile has no default vertex array.
        if s.bound_vertex_array.is_none()
            || !s.bound_buffers.contains_key(&glow::ARRAY_BUFFER)
            || !(1..=4).contains(&size)
        {
            s.errors.push(glow::INVALID_OPERATION);
        }
    }

    unsafe fn vertex_attrib_2_f32(&self, index: u32, x: f32, y: f32) {
        self.state.borrow_mut().calls.push(Call::ConstantAttrib2 {
            index,
            value: [x, y],
        });
    }

    unsafe fn vertex_attrib_4_f32(&self, index: u32, x: f32, y: f32, z: f32, w: f32) {
        self.state.borrow_mut().calls.push(Call::ConstantAttrib4 {
            index,
            value: [x, y, z, w],
        });
    }

    unsafe fn draw_elements(&self, mode: u32, count: i32, element_type: u32, _offset: i32) {
        let mut s = self.state.borrow_mut();
        let has_elements = s.binding(glow::ELEMENT_ARRAY_BUFFER).is_some();
        if s.bound_vertex_array.is_none()
            || !has_elements
            || s.current_program.is_none()
            || count < 0
        {
            s.errors.push(glow::INVALID_OPERATION);
            return;
        }
        let call = Call::Draw {
            mode,
            count,
            element_type,
            enabled: s.enabled.clone(),
            program: s.current_program,
            texture: s.bound_texture,
        };
        s.calls.push(call);
    }

    unsafe fn get_error(&self) -> u32 {
        let mut s = self.state.borrow_mut();
        if s.errors.is_empty() {
            glow::NO_ERROR
        } else {
            s.errors.remove(0)
        }
    }
}
